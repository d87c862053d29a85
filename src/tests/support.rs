//! Shared helpers for security tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::security::{
    AuthError, AuthenticatedIdentity, AuthenticationHandler, AuthenticationRequest,
};

/// Pool mechanism that accepts every request. Resolution only consults names
/// and plan configuration, so this is all the scenarios need.
struct AcceptingHandler {
    name: &'static str,
}

#[async_trait]
impl AuthenticationHandler for AcceptingHandler {
    fn name(&self) -> &str {
        self.name
    }

    fn can_handle(&self, _request: &AuthenticationRequest) -> bool {
        true
    }

    async fn authenticate(
        &self,
        _request: &AuthenticationRequest,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        Ok(AuthenticatedIdentity {
            subject: "anonymous".to_string(),
            mechanism: self.name.to_string(),
            plan_id: None,
        })
    }
}

pub fn accepting_handler(name: &'static str) -> Arc<dyn AuthenticationHandler> {
    Arc::new(AcceptingHandler { name })
}

pub fn pool_of(names: &[&'static str]) -> Vec<Arc<dyn AuthenticationHandler>> {
    names.iter().map(|name| accepting_handler(name)).collect()
}
