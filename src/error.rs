//! Error types
//!
//! `ServeError` covers everything that can go wrong while answering a single
//! request and knows how to turn itself into the fixed JSON error responses.
//! `StartupError` covers failures before the accept loop starts.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

use crate::http::response;
use crate::logger;

pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
pub const INDEX_MISSING_MESSAGE: &str = "Application not found";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";

/// Per-request failure
#[derive(Debug, Error)]
pub enum ServeError {
    /// Missing file, traversal attempt, or unmatched route.
    #[error("resource not found")]
    NotFound,

    /// `index.html` is missing from the base directory.
    #[error("index.html not found in base directory")]
    IndexMissing,

    #[error("method {0} not allowed")]
    MethodNotAllowed(hyper::Method),

    #[error("failed to build response: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("failed to serialize response body: {0}")]
    Json(#[from] serde_json::Error),

    /// The handler task panicked or was cancelled.
    #[error("request handler task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl ServeError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::IndexMissing => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Http(_) | Self::Json(_) | Self::TaskFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert into the JSON error response sent to the caller.
    ///
    /// Internal failures are logged with full detail here; the caller only
    /// ever sees the generic message.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::NotFound => response::json_error(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE),
            Self::IndexMissing => {
                logger::log_warning("index.html is missing from the base directory");
                response::json_error(StatusCode::NOT_FOUND, INDEX_MISSING_MESSAGE)
            }
            Self::MethodNotAllowed(method) => {
                logger::log_warning(&format!("Method not allowed: {method}"));
                response::method_not_allowed()
            }
            internal => {
                logger::log_error(&format!("Internal server error: {internal}"));
                response::json_error(internal.status(), INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

/// Failure while starting the server
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid bind address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("failed to initialize logging: {0}")]
    Logger(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
