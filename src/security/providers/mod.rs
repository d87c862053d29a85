//! Built-in authentication mechanisms.
//!
//! Thin by design: each mechanism extracts its credential kind from the
//! request and delegates validation to an injected backend trait
//! ([`ApiKeyStore`], [`TokenIntrospector`]). Concrete validation logic lives
//! outside this crate.

pub mod api_key;
mod keyless;
mod oauth2;

pub use api_key::{ApiKeyHandler, ApiKeyStore, ApiKeySubscription, InMemoryApiKeyStore};
pub use keyless::KeylessHandler;
pub use oauth2::{OAuth2Handler, TokenIntrospector};
