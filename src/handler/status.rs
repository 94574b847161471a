//! Status endpoints
//!
//! `/health` for deployment monitoring and `/api/status` describing where
//! card data lives. Both are side-effect free.

use chrono::{SecondsFormat, Utc};
use hyper::StatusCode;
use serde::Serialize;

use crate::error::ServeError;
use crate::http::response::{json_response, HttpResponse};

pub const SERVICE_NAME: &str = "Card Vault";
pub const SERVICE_VERSION: &str = "1.0.0";

/// Health check payload
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
    pub version: &'static str,
    pub service: &'static str,
}

impl HealthStatus {
    pub fn now() -> Self {
        Self {
            status: "healthy",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            version: SERVICE_VERSION,
            service: SERVICE_NAME,
        }
    }
}

/// API status payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiStatus {
    pub api_status: &'static str,
    pub encryption: &'static str,
    pub storage: &'static str,
    pub security: &'static str,
}

pub const API_STATUS: ApiStatus = ApiStatus {
    api_status: "active",
    encryption: "AES-256 (client-side)",
    storage: "client-side only",
    security: "no server-side data storage",
};

/// `GET /health`
pub fn health() -> Result<HttpResponse, ServeError> {
    json_response(StatusCode::OK, &HealthStatus::now())
}

/// `GET /api/status`
pub fn api_status() -> Result<HttpResponse, ServeError> {
    json_response(StatusCode::OK, &API_STATUS)
}
