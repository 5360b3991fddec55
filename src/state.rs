use std::sync::Arc;

use crate::cache::CacheAside;
use crate::clients::{UpstreamClient, build_http_client};
use crate::config::Config;
use crate::db::Store;
use crate::services::LookupService;

/// Everything a request handler needs, built once at startup.
pub struct AppState {
    pub config: Config,

    pub store: Store,

    pub lookup: LookupService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    /// Wires the services around an already connected store.
    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let http_client = build_http_client(&config)?;
        let upstream = UpstreamClient::new(http_client, config.clone());
        let lookup = LookupService::new(
            store.clone(),
            CacheAside::new(upstream),
            config.cache.clone(),
        );

        Ok(Self {
            config,
            store,
            lookup,
        })
    }
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    Ok(Arc::new(AppState::new(config).await?))
}
