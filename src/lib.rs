pub mod app;
pub mod config;
pub mod database;
mod error;
pub mod templ_manager;
pub mod turnstile;
pub mod web;

pub use app::{serve, App, AppState};
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Compact console output without timestamps, `RUST_LOG` or everything at `debug`.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .compact()
        .init();
}

/// Full output with timestamps and targets, `RUST_LOG` or everything at `info`.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
