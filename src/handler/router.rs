//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, error conversion, response middleware and access logging.

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::{static_files, status};
use crate::http::{self, response, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH, ORIGIN, RANGE, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range: Option<String>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_string(),
            is_head: parts.method == Method::HEAD,
            if_none_match: header_string(&parts.headers, IF_NONE_MATCH),
            if_modified_since: header_string(&parts.headers, IF_MODIFIED_SINCE),
            range: header_string(&parts.headers, RANGE),
        }
    }
}

/// Routes in match order; the catch-all `Asset` comes last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Index,
    Health,
    ApiStatus,
    Stylesheet,
    /// `/static/<path>`
    Static(&'a str),
    /// `/<path>` for anything not claimed above
    Asset(&'a str),
    NotFound,
}

/// Match a request path, most specific route first
pub fn match_route(path: &str) -> Route<'_> {
    match path {
        "/" => Route::Index,
        "/health" => Route::Health,
        "/api/status" => Route::ApiStatus,
        "/styles.css" => Route::Stylesheet,
        _ => {
            if let Some(rest) = path.strip_prefix("/static/") {
                Route::Static(rest)
            } else {
                match path.strip_prefix('/') {
                    Some(rest) if !rest.is_empty() => Route::Asset(rest),
                    _ => Route::NotFound,
                }
            }
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The request body is never read. Routing runs in its own task so that a
/// panic surfaces as a 500 instead of tearing down the connection.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    let (parts, _body) = req.into_parts();
    let ctx = RequestContext::from_parts(&parts);

    let task_state = Arc::clone(&state);
    let outcome = tokio::spawn(async move { dispatch(&ctx, &task_state).await }).await;

    Ok(finish_response(outcome, &parts, &state, peer_addr, started))
}

/// Turn the handler task's outcome into the final response
///
/// A panicked or cancelled task becomes a 500. Every response then gets
/// the CORS and security headers and an access log line.
fn finish_response(
    outcome: Result<Result<HttpResponse, ServeError>, JoinError>,
    parts: &Parts,
    state: &AppState,
    peer_addr: SocketAddr,
    started: Instant,
) -> HttpResponse {
    let mut resp = match outcome {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => e.into_response(),
        Err(join_error) => ServeError::from(join_error).into_response(),
    };

    http::apply_cors(
        &mut resp,
        state.config.http.enable_cors,
        parts.headers.contains_key(ORIGIN),
    );
    http::apply_security_headers(&mut resp);

    if state.config.logging.access_log {
        let entry = access_entry(parts, &resp, peer_addr, started);
        logger::log_access(&entry, state.config.logging.access_log_format);
    }

    resp
}

/// Route a request to its handler
pub async fn dispatch(ctx: &RequestContext, state: &AppState) -> Result<HttpResponse, ServeError> {
    match ctx.method {
        Method::GET | Method::HEAD => {}
        Method::OPTIONS => return Ok(response::options_response(state.config.http.enable_cors)),
        ref other => return Err(ServeError::MethodNotAllowed(other.clone())),
    }

    match match_route(&ctx.path) {
        Route::Index => static_files::serve_index(ctx, state).await,
        Route::Health => status::health(),
        Route::ApiStatus => status::api_status(),
        Route::Stylesheet => {
            static_files::serve_file(ctx, state, "styles.css", Some("text/css")).await
        }
        Route::Static(path) | Route::Asset(path) => {
            static_files::serve_file(ctx, state, path, None).await
        }
        Route::NotFound => Err(ServeError::NotFound),
    }
}

fn header_string(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn access_entry(
    parts: &Parts,
    resp: &HttpResponse,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.status = resp.status().as_u16();
    entry.body_bytes = hyper::body::Body::size_hint(resp.body())
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_string(&parts.headers, REFERER);
    entry.user_agent = header_string(&parts.headers, USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
