//! Unified application error type.
//! Store, gateway, sync engine and CLI all return AppError so that the
//! best-effort / user-visible split can be decided by the caller.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // Task store
    // ---------------------------
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task already exists: {0}")]
    DuplicateKey(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    // ---------------------------
    // Remote gateway
    // ---------------------------
    #[error("Server unreachable: {0}")]
    GatewayUnreachable(String),

    // ---------------------------
    // Input validation
    // ---------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    /// True for failures of the remote side only; callers on the
    /// merge-on-load path degrade to offline mode on these.
    pub fn is_gateway(&self) -> bool {
        matches!(self, AppError::GatewayUnreachable(_))
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::StorageUnavailable(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::GatewayUnreachable(e.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Export(e.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(e: serde_yaml::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
