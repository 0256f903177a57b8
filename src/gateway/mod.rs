//! Remote task gateway: the client's view of "the server".
//!
//! The reconciliation engine only sees [`TaskGateway`]; whether requests go
//! over HTTP or to the in-process simulator is decided once, by [`connect`].

mod http;
mod simulated;

pub use http::HttpGateway;
pub use simulated::SimulatedGateway;

use crate::config::{BackendMode, Config};
use crate::errors::AppResult;
use crate::models::Task;
use crate::utils::path::expand_tilde;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Human readable backend name for listings and logs.
    fn name(&self) -> &str;

    async fn health(&self) -> AppResult<()>;

    async fn fetch_by_date(&self, date: NaiveDate) -> AppResult<Vec<Task>>;

    /// `Ok(None)` when the server does not know the id.
    async fn fetch_by_id(&self, id: &str) -> AppResult<Option<Task>>;

    async fn fetch_all(&self) -> AppResult<Vec<Task>>;

    /// Create or replace; returns the server's (possibly normalized) copy.
    async fn upsert(&self, task: &Task) -> AppResult<Task>;

    /// Deleting an unknown id is not an error.
    async fn delete(&self, id: &str) -> AppResult<()>;

    async fn clear(&self) -> AppResult<usize>;

    /// Fill the server with sample data; returns the number of tasks written.
    async fn seed(&self) -> AppResult<usize>;
}

pub type SharedGateway = Arc<dyn TaskGateway>;

fn simulated_from(cfg: &Config) -> AppResult<SimulatedGateway> {
    let latency = Duration::from_millis(cfg.simulated_latency_ms);
    match &cfg.simulated_store {
        Some(path) => SimulatedGateway::with_file(expand_tilde(path), latency),
        None => Ok(SimulatedGateway::new(latency)),
    }
}

/// Build the gateway for this process.
///
/// `Auto` checks the HTTP server's health endpoint once; an unreachable
/// server selects the simulator for the rest of the run.
pub async fn connect(cfg: &Config) -> AppResult<SharedGateway> {
    let timeout = Duration::from_secs(cfg.request_timeout_secs.max(1));

    match cfg.backend {
        BackendMode::Http => Ok(Arc::new(HttpGateway::new(&cfg.server_url, timeout)?)),
        BackendMode::Simulated => Ok(Arc::new(simulated_from(cfg)?)),
        BackendMode::Auto => {
            let http = HttpGateway::new(&cfg.server_url, timeout)?;
            match http.health().await {
                Ok(()) => {
                    log::info!("using HTTP gateway at {}", cfg.server_url);
                    Ok(Arc::new(http))
                }
                Err(e) => {
                    log::info!(
                        "server at {} not reachable ({}), using simulated backend",
                        cfg.server_url,
                        e
                    );
                    Ok(Arc::new(simulated_from(cfg)?))
                }
            }
        }
    }
}
