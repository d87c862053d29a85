use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use super::{HandlerRegistry, Resolution, ResolveError, resolve_handlers};
use crate::definition::ApiDescriptor;

/// Configuration-activation path for API security.
///
/// Holds the latest [`Resolution`] per deployed API. Deploying an API takes a
/// pool snapshot, resolves, and replaces the stored resolution wholesale;
/// there is no incremental update. A fatal resolution error aborts activation
/// of that single API only and leaves any previously deployed resolution for
/// it in place.
pub struct SecurityManager {
    registry: Arc<HandlerRegistry>,
    deployed: RwLock<HashMap<String, Arc<Resolution>>>,
}

impl SecurityManager {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            deployed: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Resolve and activate an API. Re-deploying an already-deployed API
    /// recomputes and replaces its handler set.
    pub async fn deploy(&self, api: Arc<ApiDescriptor>) -> Result<Arc<Resolution>, ResolveError> {
        let pool = self.registry.snapshot().await;

        match resolve_handlers(&api, &pool) {
            Ok(resolution) => {
                let resolution = Arc::new(resolution);
                let mut deployed = self.deployed.write().await;
                deployed.insert(api.id.clone(), Arc::clone(&resolution));
                Ok(resolution)
            }
            Err(e) => {
                tracing::error!(api = %api, error = %e, "API activation failed");
                Err(e)
            }
        }
    }

    /// Drop an API's resolved handler set. Returns it if one was deployed.
    pub async fn undeploy(&self, api_id: &str) -> Option<Arc<Resolution>> {
        self.deployed.write().await.remove(api_id)
    }

    /// The current handler set for a deployed API, consumed by the dispatch
    /// layer per incoming request.
    pub async fn handlers_for(&self, api_id: &str) -> Option<Arc<Resolution>> {
        self.deployed.read().await.get(api_id).cloned()
    }

    /// Ids of all currently deployed APIs.
    pub async fn deployed_apis(&self) -> Vec<String> {
        self.deployed.read().await.keys().cloned().collect()
    }
}
