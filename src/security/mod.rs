//! Authentication mechanism pool and handler resolution.
//!
//! The resolution flow on API (re)publication:
//! 1. Take a consistent snapshot of the global [`HandlerRegistry`] pool.
//! 2. Run [`resolve_handlers`] for the API: plans, when any exist, fully
//!    override the legacy security mode.
//! 3. Hand the returned [`Resolution`] to the dispatch layer, which tries the
//!    wrapped handlers in order per incoming request.

mod enhancer;
mod error;
mod handler;
mod manager;
mod plan_handler;
pub mod providers;
mod registry;

pub use enhancer::{HandlerEnhancer, Resolution, resolve_handlers};
pub use error::{AuthError, ResolveError};
pub use handler::{AuthenticatedIdentity, AuthenticationHandler, AuthenticationRequest};
pub use manager::SecurityManager;
pub use plan_handler::{
    ApiScopedHandler, KeyScopedPlanHandler, PlanAwareHandler, PlanScopedHandler, SecurityContext,
    SelectionRulePlanHandler,
};
pub use registry::HandlerRegistry;

/// Match a mechanism name against a pool handler name.
///
/// Mechanism names are matched exactly but case-insensitively: a plan
/// requiring `"API_KEY"` matches a pool handler named `"api_key"`. This is
/// never a substring match.
pub(crate) fn name_matches(required: &str, candidate: &str) -> bool {
    required.eq_ignore_ascii_case(candidate)
}
