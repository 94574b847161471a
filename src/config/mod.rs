// Configuration module entry point
// Builds the immutable startup configuration from defaults, profile, file and environment

mod state;
mod types;

use config::builder::{ConfigBuilder, DefaultState};
use config::ConfigError;
use std::collections::HashMap;
use std::net::{SocketAddr, ToSocketAddrs};

use crate::error::StartupError;

// Re-export public types
pub use state::AppState;
pub use types::{
    AssetsConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, Profile,
    ProfileDefaults, SecretKey, ServerConfig, SessionConfig,
};

/// Config file looked up when none is given (extension resolved by the `config` crate)
pub const DEFAULT_CONFIG_FILE: &str = "card-vault";
pub const DEFAULT_SECRET_KEY: &str = "dev-secret-key-change-in-production";

/// Prefix for nested overrides, e.g. `CARD_VAULT__SERVER__WORKERS=4`
const ENV_PREFIX: &str = "CARD_VAULT";
const ENV_SEPARATOR: &str = "__";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// and the process environment
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        Self::build(config_path, false, std::env::vars().collect())
    }

    /// Like [`Config::load_from`], but a missing file is an error
    pub fn load_required(config_path: &str) -> Result<Self, ConfigError> {
        Self::build(config_path, true, std::env::vars().collect())
    }

    /// Load configuration from a file path and an explicit set of variables
    /// in place of the process environment
    pub fn load_with_env(
        config_path: &str,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        Self::build(config_path, false, env)
    }

    fn build(
        config_path: &str,
        file_required: bool,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let profile = match env.get("APP_PROFILE") {
            Some(name) => name.parse::<Profile>().map_err(ConfigError::Message)?,
            None => Profile::default(),
        };
        let defaults = profile.defaults();

        let mut builder = config::Config::builder()
            .set_default("debug", defaults.debug)?
            .set_default("testing", defaults.testing)?
            .set_default("secret_key", DEFAULT_SECRET_KEY)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("assets.base_dir", ".")?
            .set_default("assets.index_file", "index.html")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("logging.json", false)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?
            .set_default("performance.shutdown_grace", 5)?
            .set_default("http.enable_cors", true)?
            .set_default("session.cookie_secure", defaults.session_cookie_secure)?
            .set_default("session.cookie_httponly", true)?
            .set_default("session.cookie_samesite", "Lax")?
            .set_default("session.lifetime_secs", 3600)?;

        if let Some(max_age) = defaults.static_max_age {
            builder = builder.set_default("assets.max_age", i64::from(max_age))?;
        }

        builder = builder
            .add_source(config::File::with_name(config_path).required(file_required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(Some(env.clone())),
            );

        // The profile is chosen before any file is read, keep it consistent
        builder = builder.set_override("profile", profile.as_str())?;
        builder = apply_legacy_env(builder, &env)?;

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, StartupError> {
        let host = self.server.host.as_str();
        let invalid = |reason: String| StartupError::InvalidAddress {
            addr: format!("{host}:{}", self.server.port),
            reason,
        };

        (host, self.server.port)
            .to_socket_addrs()
            .map_err(|e| invalid(e.to_string()))?
            .next()
            .ok_or_else(|| invalid("host resolved to no addresses".to_string()))
    }

    pub fn is_production(&self) -> bool {
        self.profile == Profile::Production
    }

    /// Log level in effect when `RUST_LOG` is not set
    pub fn effective_log_level(&self) -> &str {
        match self.logging.level.as_deref() {
            Some(level) => level,
            None if self.debug => "debug",
            None => "info",
        }
    }
}

/// Apply the flat variables the application has always honoured.
///
/// These take precedence over every other source.
fn apply_legacy_env(
    mut builder: ConfigBuilder<DefaultState>,
    env: &HashMap<String, String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(host) = env.get("HOST") {
        builder = builder.set_override("server.host", host.trim())?;
    }

    if let Some(port) = env.get("PORT") {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|e| ConfigError::Message(format!("invalid PORT '{port}': {e}")))?;
        builder = builder.set_override("server.port", i64::from(port))?;
    }

    // An empty SECRET_KEY falls back to the default
    if let Some(key) = env.get("SECRET_KEY").filter(|k| !k.is_empty()) {
        builder = builder.set_override("secret_key", key.as_str())?;
    }

    // FLASK_DEBUG wins over DEBUG; only "true" enables debug
    if let Some(flag) = env.get("FLASK_DEBUG").or_else(|| env.get("DEBUG")) {
        builder = builder.set_override("debug", flag.trim().eq_ignore_ascii_case("true"))?;
    }

    if let Some(dir) = env.get("STATIC_DIR") {
        builder = builder.set_override("assets.base_dir", dir.as_str())?;
    }

    Ok(builder)
}
