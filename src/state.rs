use std::sync::Arc;

use crate::{config::AppConfig, store::Store};

/// Shared application state: the repository handle and runtime config.
/// The store is a trait object so the backing implementation can be swapped
/// without touching handlers or services.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self { store, config }
    }
}
