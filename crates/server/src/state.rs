use std::sync::Arc;

use service::kv::{KvRepository, KvService};

/// Shared handler state. Cloning is cheap; all clones share one service.
#[derive(Clone)]
pub struct ServerState {
    pub kv: Arc<KvService<dyn KvRepository>>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn KvRepository>) -> Self {
        Self { kv: Arc::new(KvService::new(repo)) }
    }
}
