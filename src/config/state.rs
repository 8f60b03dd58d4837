// Application state module
// Shared, read-only state handed to every connection task

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::types::Config;
use crate::routing::RouteTable;
use crate::service::FoodService;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Downstream executor, opened once by the caller
    pub service: Arc<dyn FoodService>,
    pub routes: RouteTable,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: Config, service: Arc<dyn FoodService>) -> Self {
        let cached_access_log = Arc::new(AtomicBool::new(config.logging.access_log));

        Self {
            config,
            service,
            routes: RouteTable::food_api(),
            cached_access_log,
        }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }
}
