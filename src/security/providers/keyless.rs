use async_trait::async_trait;

use crate::security::{
    AuthError, AuthenticatedIdentity, AuthenticationHandler, AuthenticationRequest,
};

pub const KEY_LESS_MECHANISM: &str = "key_less";

/// No-credential mechanism: applicable to every request, authenticates as an
/// anonymous identity. Typically backs free plans.
pub struct KeylessHandler;

impl KeylessHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for KeylessHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthenticationHandler for KeylessHandler {
    fn name(&self) -> &str {
        KEY_LESS_MECHANISM
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
            mechanism: KEY_LESS_MECHANISM.to_string(),
            plan_id: None,
        })
    }
}
