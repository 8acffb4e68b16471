use crate::config::AppConfig;
use crate::db::Gateway;
use crate::users::repo::UserStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    /// Loads config and builds the database gateway. Any failure here is fatal.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env());
        let gateway = Gateway::connect(&config).await?;
        Ok(Self::from_parts(config, Arc::new(gateway)))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> Self {
        Self { config, users }
    }
}
