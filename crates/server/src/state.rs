//! Application State
//!
//! Shared state across all handlers. The catalog and settings are
//! immutable after startup; sessions are the only mutable component.

use std::sync::Arc;

use shopchat_agent::SessionManager;
use shopchat_catalog::CatalogStore;
use shopchat_config::Settings;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub catalog: Arc<CatalogStore>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        catalog: Arc<CatalogStore>,
        sessions: Arc<SessionManager>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            catalog,
            sessions,
        }
    }
}
