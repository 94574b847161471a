//! Response middleware
//!
//! Header post-processing applied to every response on its way out.

use hyper::header::{
    HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use hyper::Response;

/// Attached to every response regardless of status
pub const SECURITY_HEADERS: [(HeaderName, &str); 3] = [
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (X_FRAME_OPTIONS, "DENY"),
    (X_XSS_PROTECTION, "1; mode=block"),
];

/// Insert the fixed security headers, replacing any existing values
pub fn apply_security_headers<B>(response: &mut Response<B>) {
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Allow any origin when CORS is on and the request came from a browser origin
pub fn apply_cors<B>(response: &mut Response<B>, enable_cors: bool, has_origin: bool) {
    if enable_cors && has_origin {
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}
