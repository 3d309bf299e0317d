use crate::{Result, config::ProxyConfig, guard::AllowList, proxy::ProxyClient};
use std::sync::Arc;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub client: ProxyClient,
    pub config: Arc<ProxyConfig>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self> {
        Ok(Self {
            client: ProxyClient::new(&config)?,
            config: Arc::new(config),
        })
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.config.allow_list
    }
}
