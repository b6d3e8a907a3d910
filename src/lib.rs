pub mod availability;
pub mod config;
pub mod discovery;
pub mod error;
pub mod openapi;
pub mod presentation;
pub mod routes;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;

use reqwest::Client;
use std::sync::Arc;

use crate::availability::{AvailabilityMonitor, HttpProber};
use crate::config::AppConfig;
use crate::discovery::{DiscoveryClient, SearchSession};

#[derive(Clone)]
pub struct AppState {
    pub discovery_client: Arc<DiscoveryClient>,
    pub search_session: Arc<SearchSession>,
    pub availability: Arc<AvailabilityMonitor>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire services against the configured backend. Does not start the monitor.
    pub fn new(config: AppConfig, http_client: Client) -> Self {
        let discovery_client = Arc::new(DiscoveryClient::new(
            http_client.clone(),
            &config.backend_url,
            config.discovery_timeout(),
            config.backend_start_hint.clone(),
        ));
        let search_session = Arc::new(SearchSession::new(config.fallback_photo_url.clone()));
        let availability = Arc::new(AvailabilityMonitor::new(
            Arc::new(HttpProber::new(http_client, &config.backend_url)),
            &config.backend_url,
            config.probe_timeout(),
        ));

        Self {
            discovery_client,
            search_session,
            availability,
            config: Arc::new(config),
        }
    }
}
