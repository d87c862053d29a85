use std::sync::Arc;

use async_trait::async_trait;
use subtle::ConstantTimeEq;

use crate::security::{
    AuthError, AuthenticatedIdentity, AuthenticationHandler, AuthenticationRequest,
};

pub const API_KEY_MECHANISM: &str = "api_key";
pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const API_KEY_QUERY_PARAM: &str = "api-key";

/// An active key as known to the key store: who owns it and which plan the
/// key is subscribed to. Downstream validation compares the plan binding
/// against the resolved handler's plan context.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiKeySubscription {
    pub subject: String,
    pub plan_id: String,
}

/// Key validation backend seam.
#[async_trait]
pub trait ApiKeyStore: Send + Sync {
    /// Look up an active (not revoked, not expired) key.
    async fn find_active(&self, key: &str) -> Result<Option<ApiKeySubscription>, AuthError>;
}

/// Key-based mechanism: extracts a key from the `X-Api-Key` header or the
/// `api-key` query parameter and validates it against the injected store.
pub struct ApiKeyHandler {
    store: Arc<dyn ApiKeyStore>,
}

impl ApiKeyHandler {
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        Self { store }
    }

    fn extract_key<'a>(&self, request: &'a AuthenticationRequest) -> Option<&'a str> {
        request
            .header(API_KEY_HEADER)
            .or_else(|| request.query_param(API_KEY_QUERY_PARAM))
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl AuthenticationHandler for ApiKeyHandler {
    fn name(&self) -> &str {
        API_KEY_MECHANISM
    }

    fn can_handle(&self, request: &AuthenticationRequest) -> bool {
        self.extract_key(request).is_some()
    }

    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let key = self
            .extract_key(request)
            .ok_or(AuthError::MissingCredentials)?;

        match self.store.find_active(key).await? {
            Some(subscription) => Ok(AuthenticatedIdentity {
                subject: subscription.subject,
                mechanism: API_KEY_MECHANISM.to_string(),
                plan_id: Some(subscription.plan_id),
            }),
            None => Err(AuthError::InvalidApiKey),
        }
    }
}

/// In-memory key store, mainly for tests and single-node setups.
pub struct InMemoryApiKeyStore {
    keys: Vec<(String, ApiKeySubscription)>,
}

impl InMemoryApiKeyStore {
    pub fn new(keys: Vec<(String, ApiKeySubscription)>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl ApiKeyStore for InMemoryApiKeyStore {
    async fn find_active(&self, key: &str) -> Result<Option<ApiKeySubscription>, AuthError> {
        // Constant-time comparison; `ct_eq` on slices of unequal length is
        // already false without an early timing-visible exit.
        let found = self.keys.iter().find(|(candidate, _)| {
            candidate.as_bytes().ct_eq(key.as_bytes()).into()
        });
        Ok(found.map(|(_, subscription)| subscription.clone()))
    }
}
