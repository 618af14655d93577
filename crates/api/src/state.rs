use std::sync::Arc;

use stanchion_db::store::AuthStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stanchion_db::DbPool,
    /// Read-side user store consumed by login and session validation. In
    /// production this is the pool again; tests swap in an in-memory store.
    pub store: Arc<dyn AuthStore>,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Production wiring: the pool serves both as repository handle and as
    /// the auth store.
    pub fn new(pool: stanchion_db::DbPool, config: ServerConfig) -> Self {
        Self {
            store: Arc::new(pool.clone()),
            pool,
            config: Arc::new(config),
        }
    }
}
