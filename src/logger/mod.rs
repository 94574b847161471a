//! Logger module
//!
//! Thin helpers over `tracing` used throughout the server:
//! - Subscriber setup from configuration
//! - Server lifecycle logging
//! - Access logging with multiple line formats (target `access`)
//! - Error and warning logging

mod format;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::Config;
use crate::error::StartupError;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over the configured level when set.
/// Should be called once at application startup.
pub fn init(config: &Config) -> Result<(), StartupError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.effective_log_level())
            .map_err(|e| StartupError::Logger(format!("invalid log level: {e}")))?,
    };

    let result = if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
    };

    result.map_err(|e| StartupError::Logger(e.to_string()))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Card Vault server started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Profile: {}", config.profile);
    tracing::info!("Debug mode: {}", config.debug);
    if config.testing {
        tracing::info!("Testing mode enabled");
    }
    tracing::info!("Base directory: {}", config.assets.base_dir.display());
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    tracing::info!(
        secure = config.session.cookie_secure,
        http_only = config.session.cookie_httponly,
        same_site = %config.session.cookie_samesite,
        lifetime_secs = config.session.lifetime_secs,
        "Session cookie settings"
    );
    tracing::info!("======================================");

    if config.debug && config.is_production() {
        log_warning("Debug mode is enabled under the production profile");
    }
    if config.secret_key.is_default() && config.is_production() {
        log_warning("SECRET_KEY is not set, using the built-in development key");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_debug(message: &str) {
    tracing::debug!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: AccessLogFormat) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_shutdown_started(grace_secs: u64) {
    tracing::info!("Shutdown requested, draining connections for up to {grace_secs}s");
}

pub fn log_shutdown_complete(drained: bool) {
    if drained {
        tracing::info!("All connections closed, server stopped");
    } else {
        tracing::warn!("Shutdown grace period elapsed with connections still open");
    }
}
