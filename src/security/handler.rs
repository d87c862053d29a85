use std::collections::HashMap;

use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, Method};

use super::AuthError;

/// Immutable snapshot of the request attributes consulted during
/// authentication: method, path, headers, and query parameters.
///
/// The dispatch layer builds one per incoming request; handlers and selection
/// rules only ever read it.
#[derive(Debug, Clone)]
pub struct AuthenticationRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
}

impl AuthenticationRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<HeaderName>(),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// The identity a mechanism established for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedIdentity {
    /// Who authenticated (key owner, token subject, "anonymous" for keyless).
    pub subject: String,

    /// Name of the mechanism that authenticated the request.
    pub mechanism: String,

    /// Plan the credential is subscribed to, when the backend knows it.
    /// Downstream validation compares this against the resolved handler's
    /// plan context.
    pub plan_id: Option<String>,
}

/// A named, pluggable authentication mechanism.
///
/// Implementations are registered once in the gateway's
/// [`HandlerRegistry`](super::HandlerRegistry) pool and shared read-only
/// across all API resolutions; they hold no per-API state.
#[async_trait]
pub trait AuthenticationHandler: Send + Sync {
    /// Mechanism identity, matched case-insensitively against plan and legacy
    /// security-mode names. Unique within the pool.
    fn name(&self) -> &str;

    /// Whether this handler can attempt authentication of the request —
    /// typically a credential-presence probe. A `false` here means "skip to
    /// the next handler", not "reject the request".
    fn can_handle(&self, request: &AuthenticationRequest) -> bool;

    /// Validate the request's credentials.
    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticatedIdentity, AuthError>;
}
