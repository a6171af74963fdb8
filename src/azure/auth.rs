//! Bearer tokens for Azure Resource Manager.

use super::ApiError;
use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use std::sync::Arc;

/// Token scope for the management plane.
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Source of the bearer token sent with every ARM request.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn bearer_token(&self) -> Result<String, ApiError>;
}

/// Token from the ambient Azure credential chain
/// (environment, managed identity, Azure CLI login).
pub struct IdentityToken {
    credential: Arc<dyn TokenCredential>,
}

impl IdentityToken {
    pub fn from_environment() -> Result<Self, ApiError> {
        let credential: Arc<dyn TokenCredential> =
            Arc::new(azure_identity::DefaultAzureCredential::default());
        log::debug!("Created default Azure credential chain");
        Ok(IdentityToken { credential })
    }
}

#[async_trait]
impl TokenSource for IdentityToken {
    async fn bearer_token(&self) -> Result<String, ApiError> {
        let token = self
            .credential
            .get_token(&[MANAGEMENT_SCOPE])
            .await
            .map_err(|e| ApiError::Auth(e.to_string()))?;
        Ok(token.token.secret().to_string())
    }
}

/// Fixed token, e.g. one obtained with `az account get-access-token`.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn bearer_token(&self) -> Result<String, ApiError> {
        Ok(self.0.clone())
    }
}
