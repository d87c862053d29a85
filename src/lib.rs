//! Plan-aware authentication handler resolution for API gateways.
//!
//! A gateway exposes many APIs and carries a global pool of pluggable
//! authentication mechanisms (key-based, token-based, keyless, ...). Each
//! published API either declares *plans* — named security policies binding a
//! required mechanism to per-plan validation parameters — or, when it has no
//! plans, a single legacy security mode.
//!
//! This crate computes, for one API, the ordered set of mechanisms (with plan
//! context attached) that the request-dispatch path consults at runtime:
//!
//! 1. Register mechanisms in a [`security::HandlerRegistry`].
//! 2. Describe APIs with [`definition::ApiDescriptor`] and [`definition::Plan`].
//! 3. Resolve with [`security::resolve_handlers`], or let a
//!    [`security::SecurityManager`] drive resolution on deploy/redeploy.
//!
//! Resolution is pure computation over an immutable pool snapshot; it never
//! validates credentials itself. Concrete validation backends plug in behind
//! the [`security::providers`] trait seams.

pub mod definition;
pub mod security;

#[cfg(test)]
mod tests;

pub use definition::{ApiDescriptor, ConfigError, Plan, SelectionRule};
pub use security::{
    AuthError, AuthenticatedIdentity, AuthenticationHandler, AuthenticationRequest,
    HandlerEnhancer, HandlerRegistry, PlanAwareHandler, ResolveError, Resolution, SecurityContext,
    SecurityManager, resolve_handlers,
};
