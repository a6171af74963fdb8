//! Azure resource group as seen by the export.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resource group and its tags.
///
/// Tags are kept sorted so the rendered CSV column is stable between runs.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceGroup {
    /// Resource group name, never empty.
    pub name: String,
    /// Tags set on the resource group (empty when the group has none).
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl ResourceGroup {
    pub fn new(name: impl Into<String>) -> Self {
        ResourceGroup {
            name: name.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Add a tag, builder style.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Tags as a compact JSON object, or an empty string when there are none.
    pub fn tags_field(&self) -> String {
        if self.tags.is_empty() {
            return String::new();
        }
        serde_json::to_string(&self.tags).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_field_empty() {
        assert_eq!(ResourceGroup::new("rg-empty").tags_field(), "");
    }

    #[test]
    fn test_tags_field_sorted() {
        let group = ResourceGroup::new("rg-app")
            .with_tag("team", "billing")
            .with_tag("env", "prod");
        assert_eq!(group.tags_field(), r#"{"env":"prod","team":"billing"}"#);
    }
}
