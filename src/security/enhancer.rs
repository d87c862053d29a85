//! Authentication handler resolution.
//!
//! Given the global pool of registered mechanisms and one API's
//! configuration, produce the ordered, plan-annotated subset of handlers the
//! dispatch layer consults per request. Two strategies, dispatched once per
//! resolution on whether the API declares plans:
//!
//! - plan-based: one wrapped handler per plan whose required mechanism
//!   matches the pool, in (order-hinted) declaration order;
//! - legacy fallback: the API's single security mode matched find-first
//!   against the pool, wrapped with the API itself as context.
//!
//! Plans, when any exist, fully override the legacy mode — this is a
//! priority rule, never a merge.

use std::{fmt, sync::Arc};

use super::{
    ApiScopedHandler, AuthenticationHandler, KeyScopedPlanHandler, PlanAwareHandler,
    PlanScopedHandler, ResolveError, SelectionRulePlanHandler, name_matches,
    providers::api_key::API_KEY_MECHANISM,
};
use crate::definition::{ApiDescriptor, Plan};

/// The outcome of resolving one API against the pool.
///
/// `handlers` is the request-time try-order. Non-fatal conditions are part of
/// the value: an empty handler list means "always reject as unauthenticated"
/// downstream, and `unmatched_plans` lists plans whose required mechanism is
/// not registered.
pub struct Resolution {
    handlers: Vec<Arc<dyn PlanAwareHandler>>,
    unmatched_plans: Vec<String>,
}

impl Resolution {
    /// Resolved handlers in request-time try-order.
    pub fn handlers(&self) -> &[Arc<dyn PlanAwareHandler>] {
        &self.handlers
    }

    /// Ids of plans skipped because no registered mechanism matched.
    pub fn unmatched_plans(&self) -> &[String] {
        &self.unmatched_plans
    }

    /// Number of resolved handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler was installed ("always reject" downstream).
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers: Vec<&str> = self.handlers.iter().map(|handler| handler.name()).collect();
        f.debug_struct("Resolution")
            .field("handlers", &handlers)
            .field("unmatched_plans", &self.unmatched_plans)
            .finish()
    }
}

/// Resolution engine bound to one API's configuration snapshot.
pub struct HandlerEnhancer {
    api: Arc<ApiDescriptor>,
}

impl HandlerEnhancer {
    pub fn new(api: Arc<ApiDescriptor>) -> Self {
        Self { api }
    }

    /// Reduce the full pool to the handlers applicable to the bound API.
    ///
    /// Pure computation over the given pool snapshot: no I/O, no mutation of
    /// the pool or the API. The only fatal outcome is the key-based legacy
    /// combination; everything else produces a [`Resolution`].
    pub fn filter(
        &self,
        pool: &[Arc<dyn AuthenticationHandler>],
    ) -> Result<Resolution, ResolveError> {
        // Decided once per resolution call, never re-evaluated mid-run.
        if self.api.plans.is_empty() {
            self.filter_legacy(pool)
        } else {
            Ok(self.filter_plan_based(pool))
        }
    }

    /// One wrapped handler per plan whose required mechanism is registered.
    fn filter_plan_based(&self, pool: &[Arc<dyn AuthenticationHandler>]) -> Resolution {
        tracing::debug!(api = %self.api, "Filtering authentication handlers according to API plans");

        let mut plans: Vec<&Plan> = self.api.plans.iter().collect();
        // Stable sort: equal order hints keep declaration order.
        plans.sort_by_key(|plan| plan.order);

        let mut handlers: Vec<Arc<dyn PlanAwareHandler>> = Vec::new();
        let mut unmatched_plans = Vec::new();

        for plan in plans {
            let matched = pool
                .iter()
                .find(|handler| name_matches(&plan.security, handler.name()));

            match matched {
                Some(base) => {
                    tracing::debug!(
                        api = %self.api,
                        plan = %plan.id,
                        mechanism = base.name(),
                        "Authentication handler is required by plan. Installing"
                    );
                    handlers.push(wrap_for_plan(base, plan));
                }
                None => {
                    tracing::warn!(
                        api = %self.api,
                        plan = %plan.id,
                        mechanism = %plan.security,
                        "No authentication handler matches the plan's required mechanism, skipping plan"
                    );
                    unmatched_plans.push(plan.id.clone());
                }
            }
        }

        self.report(Resolution {
            handlers,
            unmatched_plans,
        })
    }

    /// Legacy fallback: the API declares no plans, so its single security
    /// mode is matched find-first against the pool.
    fn filter_legacy(
        &self,
        pool: &[Arc<dyn AuthenticationHandler>],
    ) -> Result<Resolution, ResolveError> {
        tracing::debug!(
            api = %self.api,
            "Filtering authentication handlers according to API security options"
        );

        let mut handlers: Vec<Arc<dyn PlanAwareHandler>> = Vec::new();

        if let Some(mode) = self.api.security.as_deref()
            && let Some(base) = pool.iter().find(|handler| name_matches(mode, handler.name()))
        {
            if name_matches(base.name(), API_KEY_MECHANISM) {
                // Without a plan there is nothing to bind the key's
                // entitlements to; degrading to an unscoped key check would
                // be a security regression, so this API must not go live.
                tracing::error!(
                    api = %self.api,
                    mechanism = base.name(),
                    "Key-based legacy security mode is not supported, aborting API activation"
                );
                return Err(ResolveError::UnsupportedConfiguration {
                    api: self.api.id.clone(),
                    security: base.name().to_string(),
                });
            }

            tracing::debug!(
                api = %self.api,
                mechanism = base.name(),
                "Authentication handler is required by the API. Installing"
            );
            handlers.push(Arc::new(ApiScopedHandler::new(
                Arc::clone(base),
                Arc::clone(&self.api),
            )));
        }

        Ok(self.report(Resolution {
            handlers,
            unmatched_plans: Vec::new(),
        }))
    }

    /// Make the outcome observable: the installed handler set, or a
    /// distinguishable warning when zero handlers were installed.
    fn report(&self, resolution: Resolution) -> Resolution {
        if resolution.is_empty() {
            tracing::warn!(api = %self.api, "No authentication handler is provided for the API");
        } else {
            let installed: Vec<&str> = resolution
                .handlers
                .iter()
                .map(|handler| handler.name())
                .collect();
            tracing::info!(
                api = %self.api,
                handlers = ?installed,
                "API requires the following authentication handlers"
            );
        }
        resolution
    }
}

/// Wrap a matched handler with its plan context.
///
/// Wrappers compose: a key plan that also declares a selection rule gets the
/// rule wrapper around the key-scoped one, so the rule still gates
/// applicability per request.
fn wrap_for_plan(base: &Arc<dyn AuthenticationHandler>, plan: &Plan) -> Arc<dyn PlanAwareHandler> {
    let plan = Arc::new(plan.clone());
    if name_matches(base.name(), API_KEY_MECHANISM) {
        // Key validation is scoped by the plan attached here.
        let keyed = KeyScopedPlanHandler::new(Arc::clone(base), Arc::clone(&plan));
        if plan.selection_rule.is_some() {
            Arc::new(SelectionRulePlanHandler::new(Arc::new(keyed), plan))
        } else {
            Arc::new(keyed)
        }
    } else if plan.selection_rule.is_some() {
        Arc::new(SelectionRulePlanHandler::new(Arc::clone(base), plan))
    } else {
        Arc::new(PlanScopedHandler::new(Arc::clone(base), plan))
    }
}

/// Resolve the applicable handlers for one API against a pool snapshot.
///
/// The sole entry point for the configuration-activation path, invoked once
/// per API (re)publication.
pub fn resolve_handlers(
    api: &Arc<ApiDescriptor>,
    pool: &[Arc<dyn AuthenticationHandler>],
) -> Result<Resolution, ResolveError> {
    HandlerEnhancer::new(Arc::clone(api)).filter(pool)
}
