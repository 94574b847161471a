//! HTTP protocol layer module
//!
//! Protocol helpers independent of routing: MIME lookup, validators, byte
//! ranges, response builders and the outgoing header middleware.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use headers::{apply_cors, apply_security_headers};
pub use range::{parse_range_header, ByteRange, RangeOutcome};
pub use response::{json_error, json_response, FileHeaders, HttpResponse};
