//! Plan-context wrapper handlers.
//!
//! Resolution never hands out pool handlers directly: each resolved entry is
//! an immutable decorator pairing the base mechanism with the plan (or, on
//! the legacy path, the API) that selected it. The wrapper delegates identity
//! and validation unchanged and only attaches context, so the dispatch layer
//! can resolve plan-specific parameters after successful authentication
//! without a second lookup. Base pool handlers are shared untouched across
//! concurrent resolutions.

use std::sync::Arc;

use async_trait::async_trait;

use super::{AuthError, AuthenticatedIdentity, AuthenticationHandler, AuthenticationRequest};
use crate::definition::{ApiDescriptor, Plan};

/// The configuration object that selected a resolved handler.
#[derive(Debug, Clone)]
pub enum SecurityContext {
    /// A plan selected the handler (plan-based resolution).
    Plan(Arc<Plan>),

    /// The API itself selected the handler (legacy resolution; there is no
    /// plan, so the whole API serves as the scoping object).
    Api(Arc<ApiDescriptor>),
}

impl SecurityContext {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            SecurityContext::Plan(plan) => Some(plan),
            SecurityContext::Api(_) => None,
        }
    }

    pub fn api(&self) -> Option<&ApiDescriptor> {
        match self {
            SecurityContext::Plan(_) => None,
            SecurityContext::Api(api) => Some(api),
        }
    }

    /// Id of the originating plan or API.
    pub fn id(&self) -> &str {
        match self {
            SecurityContext::Plan(plan) => &plan.id,
            SecurityContext::Api(api) => &api.id,
        }
    }
}

/// An [`AuthenticationHandler`] annotated with the configuration context that
/// selected it during resolution.
pub trait PlanAwareHandler: AuthenticationHandler {
    fn security_context(&self) -> &SecurityContext;
}

/// Plain plan wrapper: delegation plus [`Plan`] context.
pub struct PlanScopedHandler {
    inner: Arc<dyn AuthenticationHandler>,
    context: SecurityContext,
}

impl PlanScopedHandler {
    pub fn new(inner: Arc<dyn AuthenticationHandler>, plan: Arc<Plan>) -> Self {
        Self {
            inner,
            context: SecurityContext::Plan(plan),
        }
    }
}

#[async_trait]
impl AuthenticationHandler for PlanScopedHandler {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn can_handle(&self, request: &AuthenticationRequest) -> bool {
        self.inner.can_handle(request)
    }

    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        self.inner.authenticate(request).await
    }
}

impl PlanAwareHandler for PlanScopedHandler {
    fn security_context(&self) -> &SecurityContext {
        &self.context
    }
}

/// Key-mechanism specialization: the attached plan is what downstream key
/// validation scopes the key store by (which keys are subscribed to this
/// plan, which quota applies). Validation itself is still the base
/// mechanism's, unchanged.
pub struct KeyScopedPlanHandler {
    inner: Arc<dyn AuthenticationHandler>,
    context: SecurityContext,
}

impl KeyScopedPlanHandler {
    pub fn new(inner: Arc<dyn AuthenticationHandler>, plan: Arc<Plan>) -> Self {
        Self {
            inner,
            context: SecurityContext::Plan(plan),
        }
    }
}

#[async_trait]
impl AuthenticationHandler for KeyScopedPlanHandler {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn can_handle(&self, request: &AuthenticationRequest) -> bool {
        self.inner.can_handle(request)
    }

    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        self.inner.authenticate(request).await
    }
}

impl PlanAwareHandler for KeyScopedPlanHandler {
    fn security_context(&self) -> &SecurityContext {
        &self.context
    }
}

/// Rule-bearing plan wrapper: evaluates the plan's selection rule in
/// `can_handle`, so a non-matching request skips this plan's handler and the
/// dispatch layer moves on to the next entry.
pub struct SelectionRulePlanHandler {
    inner: Arc<dyn AuthenticationHandler>,
    context: SecurityContext,
}

impl SelectionRulePlanHandler {
    pub fn new(inner: Arc<dyn AuthenticationHandler>, plan: Arc<Plan>) -> Self {
        Self {
            inner,
            context: SecurityContext::Plan(plan),
        }
    }
}

#[async_trait]
impl AuthenticationHandler for SelectionRulePlanHandler {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn can_handle(&self, request: &AuthenticationRequest) -> bool {
        let rule_matches = self
            .context
            .plan()
            .and_then(|plan| plan.selection_rule.as_ref())
            .is_none_or(|rule| rule.matches(request));
        rule_matches && self.inner.can_handle(request)
    }

    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        self.inner.authenticate(request).await
    }
}

impl PlanAwareHandler for SelectionRulePlanHandler {
    fn security_context(&self) -> &SecurityContext {
        &self.context
    }
}

/// Legacy wrapper: no plan exists, so the whole API descriptor is the scoping
/// object attached to the single matched handler.
pub struct ApiScopedHandler {
    inner: Arc<dyn AuthenticationHandler>,
    context: SecurityContext,
}

impl ApiScopedHandler {
    pub fn new(inner: Arc<dyn AuthenticationHandler>, api: Arc<ApiDescriptor>) -> Self {
        Self {
            inner,
            context: SecurityContext::Api(api),
        }
    }
}

#[async_trait]
impl AuthenticationHandler for ApiScopedHandler {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn can_handle(&self, request: &AuthenticationRequest) -> bool {
        self.inner.can_handle(request)
    }

    async fn authenticate(
        &self,
        request: &AuthenticationRequest,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        self.inner.authenticate(request).await
    }
}

impl PlanAwareHandler for ApiScopedHandler {
    fn security_context(&self) -> &SecurityContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::SelectionRule;
    use crate::security::providers::KeylessHandler;
    use http::Method;

    fn keyless() -> Arc<dyn AuthenticationHandler> {
        Arc::new(KeylessHandler::new())
    }

    #[tokio::test]
    async fn test_plan_wrapper_delegates_identity_and_validation() {
        let plan = Arc::new(Plan::new("free", "key_less"));
        let wrapper = PlanScopedHandler::new(keyless(), plan);

        let request = AuthenticationRequest::new(Method::GET, "/echo");
        assert_eq!(wrapper.name(), "key_less");
        assert!(wrapper.can_handle(&request));

        let identity = wrapper.authenticate(&request).await.unwrap();
        assert_eq!(identity.mechanism, "key_less");
        assert_eq!(wrapper.security_context().id(), "free");
        assert_eq!(wrapper.security_context().plan().unwrap().id, "free");
        assert!(wrapper.security_context().api().is_none());
    }

    #[test]
    fn test_selection_rule_wrapper_gates_can_handle() {
        let plan = Arc::new(Plan::new("partner", "key_less").with_selection_rule(
            SelectionRule::HeaderEquals {
                name: "X-Channel".to_string(),
                value: "partner".to_string(),
            },
        ));
        let wrapper = SelectionRulePlanHandler::new(keyless(), plan);

        let matching =
            AuthenticationRequest::new(Method::GET, "/echo").with_header("X-Channel", "partner");
        let other =
            AuthenticationRequest::new(Method::GET, "/echo").with_header("X-Channel", "internal");

        assert!(wrapper.can_handle(&matching));
        assert!(!wrapper.can_handle(&other));
    }

    #[test]
    fn test_api_wrapper_exposes_api_context() {
        let api = Arc::new(ApiDescriptor::new("echo-v1", "Echo").with_security("key_less"));
        let wrapper = ApiScopedHandler::new(keyless(), api);

        assert_eq!(wrapper.security_context().id(), "echo-v1");
        assert!(wrapper.security_context().plan().is_none());
        assert_eq!(wrapper.security_context().api().unwrap().id, "echo-v1");
    }
}
