use crate::config::settings::AppConfig;
use crate::infrastructure::storage::scratch::StorageArea;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: StorageArea,
}

impl AppState {
    pub fn new(config: AppConfig, storage: StorageArea) -> Self {
        Self {
            config: Arc::new(config),
            storage,
        }
    }
}
