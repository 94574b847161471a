// Application state module
// Read-only state shared by every connection

use std::path::Path;

use super::types::Config;

/// Application state
///
/// Built once at startup and shared behind an `Arc`; nothing in it changes
/// while the server runs.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Directory static files are resolved against
    pub fn base_dir(&self) -> &Path {
        &self.config.assets.base_dir
    }

    /// `Cache-Control` value for static file responses
    pub fn cache_control(&self) -> String {
        self.config
            .assets
            .max_age
            .map_or_else(|| "no-cache".to_string(), |age| format!("public, max-age={age}"))
    }
}
