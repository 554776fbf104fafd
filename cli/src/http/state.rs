use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use postman_ext_plugins::Services;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub stats: Arc<RwLock<ServerStats>>,
}

impl AppState {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            stats: Arc::new(RwLock::new(ServerStats::new())),
        }
    }

    pub fn record_request(&self, endpoint: &str) {
        self.stats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .increment_request(endpoint);
    }

    pub fn record_error(&self) {
        self.stats
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .increment_error();
    }
}

#[derive(Debug)]
pub struct ServerStats {
    started: Instant,
    pub requests_total: u64,
    pub errors_total: u64,
    pub per_endpoint: HashMap<String, u64>,
}

impl ServerStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            requests_total: 0,
            errors_total: 0,
            per_endpoint: HashMap::new(),
        }
    }

    pub fn increment_request(&mut self, endpoint: &str) {
        self.requests_total += 1;
        *self.per_endpoint.entry(endpoint.to_string()).or_default() += 1;
    }

    pub fn increment_error(&mut self) {
        self.errors_total += 1;
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

impl Default for ServerStats {
    fn default() -> Self {
        Self::new()
    }
}
