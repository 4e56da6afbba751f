use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::TeamId;
use crate::storage::ScoutStore;

#[derive(Clone)]
pub struct AppState {
    pub store: ScoutStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: ScoutStore, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn home_team(&self) -> TeamId {
        TeamId::from(self.config.home_team.as_str())
    }
}
