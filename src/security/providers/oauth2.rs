use std::sync::Arc;

use async_trait::async_trait;

use crate::security::{
    AuthError, AuthenticatedIdentity, AuthenticationHandler, AuthenticationRequest,
};

pub const OAUTH2_MECHANISM: &str = "oauth2";

const AUTHORIZATION_HEADER: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// Token validation backend seam: resolves a bearer token to its subject, or
/// `None` when the token is unknown, expired, or revoked.
#[async_trait]
pub trait TokenIntrospector: Send + Sync {
    async fn introspect(&self, token: &str) -> Result<Option<String>, AuthError>;
}

/// Token-based mechanism: extracts a bearer token from the `Authorization`
/// header and validates it via the injected introspector.
pub struct OAuth2Handler {
    introspector: Arc<dyn TokenIntrospector>,
}

impl OAuth2Handler {
    pub fn new(introspector: Arc<dyn TokenIntrospector>) -> Self {
        Self { introspector }
    }

    fn extract_token<'a>(&self, request: &'a AuthenticationRequest) -> Option<&'a str> {
        request
            .header(AUTHORIZATION_HEADER)
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .filter(|token| !token.is_empty())
    }
}

#[async_trait]
impl AuthenticationHandler for OAuth2Handler {
    fn name(&self) -> &str {
        OAUTH2_MECHANISM
    }

    fn can_handle(&self, request: &AuthenticationRequest) -> bool {
        self.extract_token(request).is_some()
    }

    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let token = self
            .extract_token(request)
            .ok_or(AuthError::MissingCredentials)?;

        match self.introspector.introspect(token).await? {
            Some(subject) => Ok(AuthenticatedIdentity {
                subject,
                mechanism: OAUTH2_MECHANISM.to_string(),
                plan_id: None,
            }),
            None => Err(AuthError::InvalidToken),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    struct StaticIntrospector;

    #[async_trait]
    impl TokenIntrospector for StaticIntrospector {
        async fn introspect(&self, token: &str) -> Result<Option<String>, AuthError> {
            Ok((token == "t-valid").then(|| "alice".to_string()))
        }
    }

    fn handler() -> OAuth2Handler {
        OAuth2Handler::new(Arc::new(StaticIntrospector))
    }

    #[test]
    fn test_can_handle_requires_bearer_scheme() {
        let handler = handler();
        let bearer = AuthenticationRequest::new(Method::GET, "/orders")
            .with_header(AUTHORIZATION_HEADER, "Bearer t-valid");
        let basic = AuthenticationRequest::new(Method::GET, "/orders")
            .with_header(AUTHORIZATION_HEADER, "Basic dXNlcjpwdw==");
        let bare = AuthenticationRequest::new(Method::GET, "/orders");

        assert!(handler.can_handle(&bearer));
        assert!(!handler.can_handle(&basic));
        assert!(!handler.can_handle(&bare));
    }

    #[tokio::test]
    async fn test_authenticate_valid_token() {
        let handler = handler();
        let request = AuthenticationRequest::new(Method::GET, "/orders")
            .with_header(AUTHORIZATION_HEADER, "Bearer t-valid");

        let identity = handler.authenticate(&request).await.unwrap();
        assert_eq!(identity.subject, "alice");
        assert_eq!(identity.mechanism, "oauth2");
    }

    #[tokio::test]
    async fn test_authenticate_rejects_unknown_token() {
        let handler = handler();
        let request = AuthenticationRequest::new(Method::GET, "/orders")
            .with_header(AUTHORIZATION_HEADER, "Bearer t-expired");

        let err = handler.authenticate(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
