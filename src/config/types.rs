// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::logger::AccessLogFormat;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub profile: Profile,
    pub debug: bool,
    pub testing: bool,
    pub secret_key: SecretKey,
    pub server: ServerConfig,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
}

/// Named configuration profile
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Development,
    Production,
    Testing,
}

/// Values a profile contributes before files and environment are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileDefaults {
    pub debug: bool,
    pub testing: bool,
    pub session_cookie_secure: bool,
    /// `Cache-Control` max-age for static files, `None` sends `no-cache`
    pub static_max_age: Option<u32>,
}

impl Profile {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }

    pub const fn defaults(self) -> ProfileDefaults {
        match self {
            Self::Development => ProfileDefaults {
                debug: true,
                testing: false,
                session_cookie_secure: false,
                static_max_age: None,
            },
            Self::Production => ProfileDefaults {
                debug: false,
                testing: false,
                session_cookie_secure: true,
                static_max_age: Some(3600),
            },
            Self::Testing => ProfileDefaults {
                debug: true,
                testing: true,
                session_cookie_secure: false,
                static_max_age: None,
            },
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "default" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "testing" => Ok(Self::Testing),
            other => Err(format!(
                "unknown profile '{other}' (expected development, production or testing)"
            )),
        }
    }
}

/// Session signing secret, redacted in debug output
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct SecretKey(pub(super) String);

impl SecretKey {
    pub fn is_default(&self) -> bool {
        self.0 == super::DEFAULT_SECRET_KEY
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Static asset configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    /// Directory all files are resolved against
    pub base_dir: PathBuf,
    /// File served for `/`
    pub index_file: String,
    /// `Cache-Control` max-age in seconds
    #[serde(default)]
    pub max_age: Option<u32>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Explicit level; falls back to `debug` in debug mode, `info` otherwise
    #[serde(default)]
    pub level: Option<String>,
    pub access_log: bool,
    /// Access log line format: `combined`, `common` or `json`
    pub access_log_format: AccessLogFormat,
    /// Emit structured JSON instead of human-readable lines
    pub json: bool,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound on a single connection's lifetime, in seconds
    pub connection_timeout: u64,
    /// Time open connections get to finish after shutdown, in seconds
    pub shutdown_grace: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub enable_cors: bool,
}

/// Session cookie settings
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub cookie_secure: bool,
    pub cookie_httponly: bool,
    pub cookie_samesite: String,
    pub lifetime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_parse() {
        assert_eq!("production".parse::<Profile>(), Ok(Profile::Production));
        assert_eq!(" Testing ".parse::<Profile>(), Ok(Profile::Testing));
        assert_eq!("default".parse::<Profile>(), Ok(Profile::Development));
        assert!("staging".parse::<Profile>().is_err());
    }

    #[test]
    fn test_profile_defaults() {
        let prod = Profile::Production.defaults();
        assert!(!prod.debug);
        assert!(prod.session_cookie_secure);
        assert_eq!(prod.static_max_age, Some(3600));

        let testing = Profile::Testing.defaults();
        assert!(testing.debug && testing.testing);
        assert!(!testing.session_cookie_secure);
    }

    #[test]
    fn test_secret_key_redacted() {
        let key = SecretKey("hunter2".to_string());
        assert_eq!(format!("{key:?}"), "SecretKey(<redacted>)");
        assert!(!key.is_default());
    }
}
