//! Request handler module
//!
//! Route dispatch, static file serving and the JSON status endpoints.

pub mod router;
pub mod static_files;
pub mod status;

// Re-export main entry point
pub use router::{dispatch, handle_request, match_route, RequestContext, Route};
