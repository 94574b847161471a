//! HTTP response building module
//!
//! Builders for JSON payloads, fixed error bodies and static file responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG,
    LAST_MODIFIED,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::{ServeError, METHOD_NOT_ALLOWED_MESSAGE};
use crate::http::range::ByteRange;

pub type HttpResponse = Response<Full<Bytes>>;

const JSON: &str = "application/json";
const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Validators and caching headers shared by every response for one file
#[derive(Debug, Clone)]
pub struct FileHeaders<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
    pub cache_control: &'a str,
}

impl FileHeaders<'_> {
    fn apply(&self, mut builder: Builder) -> Builder {
        builder = builder
            .header(ETAG, self.etag)
            .header(CACHE_CONTROL, self.cache_control);
        if let Some(last_modified) = self.last_modified {
            builder = builder.header(LAST_MODIFIED, last_modified);
        }
        builder
    }
}

/// Build JSON response
pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<HttpResponse, ServeError> {
    let json = serde_json::to_vec(body)?;
    let response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .header(CONTENT_LENGTH, json.len())
        .body(Full::new(Bytes::from(json)))?;
    Ok(response)
}

/// `{"error": message}` with the given status
pub fn json_error(status: StatusCode, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .header(CONTENT_LENGTH, body.len())
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback(status)
        })
}

/// Build 405 Method Not Allowed response
pub fn method_not_allowed() -> HttpResponse {
    let mut response = json_error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_MESSAGE);
    response
        .headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    response
}

/// Build OPTIONS response (preflight request)
pub fn options_response(enable_cors: bool) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header("Access-Control-Allow-Headers", "Content-Type, Range")
            .header("Access-Control-Max-Age", "86400");
    }

    builder.body(Full::new(Bytes::new())).unwrap_or_else(|e| {
        log_build_error("OPTIONS", &e);
        fallback(StatusCode::NO_CONTENT)
    })
}

/// Build 200 response carrying a whole file
pub fn file_response(
    content: Bytes,
    headers: &FileHeaders<'_>,
    is_head: bool,
) -> Result<HttpResponse, ServeError> {
    let content_length = content.len();
    let body = if is_head { Bytes::new() } else { content };

    let builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes");
    Ok(headers.apply(builder).body(Full::new(body))?)
}

/// Build 206 Partial Content response
pub fn partial_response(
    content: &Bytes,
    range: ByteRange,
    headers: &FileHeaders<'_>,
    is_head: bool,
) -> Result<HttpResponse, ServeError> {
    let body = if is_head {
        Bytes::new()
    } else {
        content.slice(range.start..=range.end)
    };

    let builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, headers.content_type)
        .header(CONTENT_LENGTH, range.content_length())
        .header(CONTENT_RANGE, range.content_range(content.len()))
        .header(ACCEPT_RANGES, "bytes");
    Ok(headers.apply(builder).body(Full::new(body))?)
}

/// Build 304 Not Modified response
pub fn not_modified(headers: &FileHeaders<'_>) -> Result<HttpResponse, ServeError> {
    let builder = Response::builder().status(StatusCode::NOT_MODIFIED);
    Ok(headers.apply(builder).body(Full::new(Bytes::new()))?)
}

/// Build 416 Range Not Satisfiable response
pub fn range_not_satisfiable(file_size: usize) -> HttpResponse {
    let mut response = json_error(StatusCode::RANGE_NOT_SATISFIABLE, "Range not satisfiable");
    if let Ok(value) = format!("bytes */{file_size}").parse() {
        response.headers_mut().insert(CONTENT_RANGE, value);
    }
    response
}

fn fallback(status: StatusCode) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn headers() -> FileHeaders<'static> {
        FileHeaders {
            content_type: "text/css",
            etag: "\"a-1\"",
            last_modified: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            cache_control: "no-cache",
        }
    }

    async fn body_bytes(resp: HttpResponse) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_json_response() {
        let resp = json_response(StatusCode::OK, &serde_json::json!({"ok": true})).unwrap();
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_bytes(resp).await, Bytes::from_static(br#"{"ok":true}"#));
    }

    #[tokio::test]
    async fn test_file_response_head_keeps_length() {
        let resp = file_response(Bytes::from_static(b"body{}"), &headers(), true).unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_LENGTH], "6");
        assert_eq!(resp.headers()[ETAG], "\"a-1\"");
        assert_eq!(resp.headers()[LAST_MODIFIED], "Sun, 06 Nov 1994 08:49:37 GMT");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_response() {
        let content = Bytes::from_static(b"0123456789");
        let range = ByteRange { start: 2, end: 4 };
        let resp = partial_response(&content, range, &headers(), false).unwrap();
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes 2-4/10");
        assert_eq!(resp.headers()[CONTENT_LENGTH], "3");
        assert_eq!(body_bytes(resp).await, Bytes::from_static(b"234"));
    }

    #[test]
    fn test_range_not_satisfiable() {
        let resp = range_not_satisfiable(10);
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()[CONTENT_RANGE], "bytes */10");
    }

    #[test]
    fn test_options_response() {
        let resp = options_response(true);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");

        let resp = options_response(false);
        assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD, OPTIONS");
    }
}
