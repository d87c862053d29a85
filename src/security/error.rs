/// Runtime authentication failures surfaced by mechanism implementations.
///
/// The resolution engine itself never raises these; they belong to the
/// `validate(request)` capability that the dispatch layer invokes per request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credentials of the mechanism's kind were provided.
    #[error("authentication credentials required")]
    MissingCredentials,

    /// An API key was provided but is unknown, revoked, or expired.
    #[error("invalid or expired API key")]
    InvalidApiKey,

    /// A token was provided but failed introspection.
    #[error("invalid authentication token")]
    InvalidToken,

    /// Unexpected failure in a validation backend.
    #[error("internal error during authentication: {0}")]
    Internal(String),
}

/// Configuration-fatal resolution failures.
///
/// Fatal for the activation of the one API being resolved, never for the
/// gateway process. Non-fatal conditions (no handler matched, some plans
/// unmatched) are reported through the [`Resolution`](super::Resolution)
/// value and tracing, not as errors.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The API's legacy security mode names the key-based mechanism, which
    /// requires a plan to scope key validation against. Activating the API
    /// with an unscoped key check would be a security regression, so this
    /// fails fast instead.
    #[error(
        "API '{api}' declares unsupported legacy security mode '{security}': \
         key-based authentication requires a plan to scope key validation"
    )]
    UnsupportedConfiguration { api: String, security: String },
}
