use std::sync::Arc;

use tokio::sync::RwLock;

use super::{AuthenticationHandler, name_matches};

/// The global pool of registered authentication mechanisms.
///
/// Read-mostly: mechanisms are registered at gateway startup and on plugin
/// reload; every in-flight resolution reads a consistent snapshot. The pool
/// keeps insertion order, which is the find-first order for legacy
/// security-mode matching.
pub struct HandlerRegistry {
    handlers: RwLock<Vec<Arc<dyn AuthenticationHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Register a mechanism. An existing mechanism with the same name
    /// (case-insensitive) is replaced in place, keeping its pool position.
    pub async fn register(&self, handler: Arc<dyn AuthenticationHandler>) {
        let mut handlers = self.handlers.write().await;
        match handlers
            .iter()
            .position(|h| name_matches(h.name(), handler.name()))
        {
            Some(index) => {
                tracing::debug!(mechanism = handler.name(), "Replacing authentication handler");
                handlers[index] = handler;
            }
            None => {
                tracing::debug!(mechanism = handler.name(), "Registering authentication handler");
                handlers.push(handler);
            }
        }
    }

    /// Remove a mechanism by name. Returns the removed handler if one existed.
    pub async fn deregister(&self, name: &str) -> Option<Arc<dyn AuthenticationHandler>> {
        let mut handlers = self.handlers.write().await;
        let index = handlers.iter().position(|h| name_matches(h.name(), name))?;
        Some(handlers.remove(index))
    }

    /// A consistent snapshot of the pool for one resolution run. Later
    /// registrations do not become visible to a resolution already holding a
    /// snapshot.
    pub async fn snapshot(&self) -> Vec<Arc<dyn AuthenticationHandler>> {
        self.handlers.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handlers.read().await.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::providers::KeylessHandler;
    use crate::tests::support::accepting_handler;

    #[tokio::test]
    async fn test_register_and_snapshot_preserve_order() {
        let registry = HandlerRegistry::new();
        registry.register(accepting_handler("api_key")).await;
        registry.register(accepting_handler("oauth2")).await;
        registry.register(Arc::new(KeylessHandler::new())).await;

        let snapshot = registry.snapshot().await;
        let names: Vec<&str> = snapshot.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["api_key", "oauth2", "key_less"]);
    }

    #[tokio::test]
    async fn test_register_replaces_same_name_in_place() {
        let registry = HandlerRegistry::new();
        registry.register(accepting_handler("api_key")).await;
        registry.register(accepting_handler("oauth2")).await;
        // Same mechanism, different case: replaces, does not append.
        registry.register(accepting_handler("API_KEY")).await;

        let snapshot = registry.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name(), "API_KEY");
        assert_eq!(snapshot[1].name(), "oauth2");
    }

    #[tokio::test]
    async fn test_deregister() {
        let registry = HandlerRegistry::new();
        registry.register(accepting_handler("api_key")).await;
        assert_eq!(registry.len().await, 1);

        let removed = registry.deregister("API_KEY").await;
        assert!(removed.is_some());
        assert!(registry.is_empty().await);

        assert!(registry.deregister("api_key").await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_is_isolated_from_later_registrations() {
        let registry = HandlerRegistry::new();
        registry.register(accepting_handler("oauth2")).await;

        let snapshot = registry.snapshot().await;
        registry.register(accepting_handler("api_key")).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len().await, 2);
    }
}
