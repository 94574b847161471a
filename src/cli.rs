//! Command line interface

use clap::Parser;

use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::StartupError;

#[derive(Parser, Debug)]
#[command(name = "card-vault")]
#[command(about = "Static file and status server for the Card Vault application")]
#[command(version)]
pub struct Cli {
    /// Config file path without extension; must exist when given
    #[arg(env = "CARD_VAULT_CONFIG")]
    pub config: Option<String>,
}

impl Cli {
    /// Load configuration, falling back to an optional `card-vault` file
    pub fn load_config(&self) -> Result<Config, StartupError> {
        let config = match self.config.as_deref() {
            Some(path) => Config::load_required(path)?,
            None => Config::load_from(DEFAULT_CONFIG_FILE)?,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_config_argument() {
        let cli = Cli::try_parse_from(["card-vault", "deploy/vault"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("deploy/vault"));
    }

    #[test]
    fn test_help_and_version_do_not_start() {
        let err = Cli::try_parse_from(["card-vault", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);

        let err = Cli::try_parse_from(["card-vault", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let err = Cli::try_parse_from(["card-vault", "--port", "80"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let cli = Cli {
            config: Some("does-not-exist/card-vault".to_string()),
        };
        assert!(matches!(cli.load_config(), Err(StartupError::Config(_))));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
