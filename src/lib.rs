//! Card Vault static server
//!
//! Serves the browser-side Card Vault application (HTML/CSS/JS) and two JSON
//! status endpoints. All card handling happens in the client; the server keeps
//! no state between requests.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{AppState, Config, Profile};
pub use error::{ServeError, StartupError};
