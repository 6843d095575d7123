use std::sync::Arc;

use crate::config::ServerConfig;
use crate::metrics::MetricsClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sensordash_db::DbPool,
    /// Server configuration (auth, search scoping).
    pub config: Arc<ServerConfig>,
    /// Client for the time-series metrics endpoint.
    pub metrics: Arc<MetricsClient>,
}
