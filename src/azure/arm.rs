//! Azure Resource Manager REST client.
//!
//! Implements [`CostApi`] over `reqwest`, following `nextLink` pagination
//! for every listing and for the cost query.

use super::{ApiError, CostApi, QueryDefinition, QueryResult, TokenSource};
use crate::models::ResourceGroup;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MANAGEMENT_URL: &str = "https://management.azure.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";
const RESOURCE_GROUPS_API_VERSION: &str = "2021-04-01";
const COST_QUERY_API_VERSION: &str = "2023-03-01";

/// One page of an ARM list operation.
#[derive(Deserialize, Debug)]
struct ListPage<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SubscriptionEntry {
    subscription_id: String,
    display_name: Option<String>,
    state: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ResourceGroupEntry {
    name: String,
    tags: Option<BTreeMap<String, String>>,
}

impl From<ResourceGroupEntry> for ResourceGroup {
    fn from(entry: ResourceGroupEntry) -> Self {
        ResourceGroup {
            name: entry.name,
            tags: entry.tags.unwrap_or_default(),
        }
    }
}

/// Client for `management.azure.com` (or a compatible endpoint).
pub struct ArmClient {
    http: Client,
    base_url: String,
    token: Arc<dyn TokenSource>,
}

impl ArmClient {
    pub fn new(base_url: &str, token: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(format!("azure-cost-export/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(ArmClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn subscriptions_url(&self) -> String {
        format!(
            "{}/subscriptions?api-version={SUBSCRIPTIONS_API_VERSION}",
            self.base_url
        )
    }

    fn resource_groups_url(&self, subscription_id: &str) -> String {
        format!(
            "{}/subscriptions/{subscription_id}/resourcegroups?api-version={RESOURCE_GROUPS_API_VERSION}",
            self.base_url
        )
    }

    fn cost_query_url(&self, subscription_id: &str) -> String {
        format!(
            "{}/subscriptions/{subscription_id}/providers/Microsoft.CostManagement/query?api-version={COST_QUERY_API_VERSION}",
            self.base_url
        )
    }

    /// Send with the bearer token and return the body of a 2xx response.
    async fn execute(&self, request: RequestBuilder, url: &str) -> Result<String, ApiError> {
        let token = self.token.bearer_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{url}: {e}")))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("{url}: {e}")))?;

        if !status.is_success() {
            log::debug!("{status} from {url}");
            return Err(ApiError::from_response(status, &headers, url, &body));
        }
        log::trace!("{status} from {url}, body.len()={}", body.len());
        Ok(body)
    }

    /// GET every page of a list operation.
    async fn list_all<T: DeserializeOwned>(&self, first_url: String) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        let mut next = Some(first_url);
        let mut seen = HashSet::new();
        let mut page = 0;

        while let Some(url) = next {
            check_next_link(&mut seen, &url)?;
            let body = self.execute(self.http.get(&url), &url).await?;
            let parsed: ListPage<T> = decode(&body, &url)?;
            log::debug!(
                "got page#{page:2} items=+{:3} from {url}",
                parsed.value.len()
            );
            items.extend(parsed.value);
            next = parsed.next_link.filter(|link| !link.is_empty());
            page += 1;
        }
        Ok(items)
    }
}

/// Record `url` as fetched; a link seen before means the paging never ends.
fn check_next_link(seen: &mut HashSet<String>, url: &str) -> Result<(), ApiError> {
    if !seen.insert(url.to_string()) {
        return Err(ApiError::Decode(format!(
            "nextLink already fetched - possible infinite loop: {url}"
        )));
    }
    Ok(())
}

/// Deserialize with the JSON path of the failing field in the error.
fn decode<T: DeserializeOwned>(body: &str, url: &str) -> Result<T, ApiError> {
    let mut deserializer = serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", body);
        ApiError::Decode(format!("{url}: path={} error={}", e.path(), e))
    })
}

#[async_trait]
impl CostApi for ArmClient {
    async fn subscription_ids(&self) -> Result<Vec<String>, ApiError> {
        let subscriptions: Vec<SubscriptionEntry> = self.list_all(self.subscriptions_url()).await?;
        for s in &subscriptions {
            log::debug!(
                "subscription {} name={:?} state={:?}",
                s.subscription_id,
                s.display_name,
                s.state
            );
        }
        Ok(subscriptions
            .into_iter()
            .map(|s| s.subscription_id)
            .collect())
    }

    async fn resource_groups(&self, subscription_id: &str) -> Result<Vec<ResourceGroup>, ApiError> {
        let groups: Vec<ResourceGroupEntry> = self
            .list_all(self.resource_groups_url(subscription_id))
            .await?;
        Ok(groups.into_iter().map(ResourceGroup::from).collect())
    }

    async fn query_usage(
        &self,
        subscription_id: &str,
        query: &QueryDefinition,
    ) -> Result<Vec<Vec<Value>>, ApiError> {
        let mut rows = Vec::new();
        let mut next = Some(self.cost_query_url(subscription_id));
        let mut seen = HashSet::new();

        // Later pages are fetched by POSTing the same body to nextLink.
        while let Some(url) = next {
            check_next_link(&mut seen, &url)?;
            let body = self.execute(self.http.post(&url).json(query), &url).await?;
            let parsed: QueryResult = decode(&body, &url)?;
            rows.extend(parsed.properties.rows);
            next = parsed.properties.next_link.filter(|link| !link.is_empty());
        }
        Ok(rows)
    }
}
