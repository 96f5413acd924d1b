//! Page configuration
//!
//! Everything has a default, so the page runs against Helius devnet with no
//! config file at all. Precedence: defaults < config file < environment <
//! command-line flags (applied by the binary).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chain_sol::Pubkey;
use serde::{Deserialize, Serialize};
use sol_rpc::{CommitmentLevel, ConfirmOptions};
use thiserror::Error;

pub const ENV_RPC_URL: &str = "TOKENONANA_RPC_URL";
pub const ENV_API_KEY: &str = "TOKENONANA_API_KEY";
pub const ENV_MINT: &str = "TOKENONANA_MINT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// RPC node URL, without the API key.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Helius API key, appended as the `api-key` query parameter when set.
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub commitment: CommitmentLevel,

    /// Decimals for newly created mints and for checked mint/burn.
    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Mint the transfer/mint/burn handlers operate on.
    #[serde(default)]
    pub mint: Option<String>,

    /// Wallet keypair file. Falls back to the Solana CLI default.
    #[serde(default)]
    pub keypair: Option<PathBuf>,

    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_rpc_url() -> String {
    "https://devnet.helius-rpc.com/".to_string()
}

fn default_decimals() -> u8 {
    9
}

fn default_confirm_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rpc_url: default_rpc_url(),
            api_key: String::new(),
            commitment: CommitmentLevel::default(),
            decimals: default_decimals(),
            mint: None,
            keypair: None,
            confirm_timeout_secs: default_confirm_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Config {
    /// Load configuration with environment overrides applied.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// read if present and defaults are used otherwise. The result is not
    /// validated: callers layer command-line flags on top, then call
    /// [`Config::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// [`Config::load`] with an explicit variable lookup.
    pub fn load_with(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    log::debug!("No config file, using defaults");
                    Config::default()
                }
            },
        };

        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config from: {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// `$XDG_CONFIG_HOME/tokenonana/config.toml` or the platform equivalent.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tokenonana").join("config.toml"))
    }

    /// The keypair `solana-keygen new` writes by default.
    pub fn default_keypair_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("solana").join("id.json"))
    }

    /// Apply environment-style overrides; `lookup` returns a variable's value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            self.api_key = key;
        }
        if let Some(mint) = lookup(ENV_MINT) {
            self.mint = Some(mint);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::InvalidRpcUrl(self.rpc_url.clone()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "poll_interval_ms must be > 0".to_string(),
            ));
        }
        self.mint_pubkey()?;
        Ok(())
    }

    /// The RPC URL with the API key attached.
    pub fn endpoint(&self) -> String {
        if self.api_key.is_empty() {
            return self.rpc_url.clone();
        }
        let separator = if self.rpc_url.contains('?') { '&' } else { '?' };
        format!("{}{}api-key={}", self.rpc_url, separator, self.api_key)
    }

    pub fn mint_pubkey(&self) -> Result<Option<Pubkey>, ConfigError> {
        self.mint
            .as_deref()
            .map(|mint| {
                mint.parse::<Pubkey>()
                    .map_err(|e| ConfigError::InvalidMint(format!("{mint}: {e}")))
            })
            .transpose()
    }

    pub fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_secs(self.confirm_timeout_secs),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid mint: {0}")]
    InvalidMint(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_target_helius_devnet() {
        let config = Config::default();
        assert_eq!(config.endpoint(), "https://devnet.helius-rpc.com/");
        assert_eq!(config.commitment, CommitmentLevel::Processed);
        assert_eq!(config.decimals, 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn endpoint_appends_api_key() {
        let mut config = Config {
            api_key: "k3y".into(),
            ..Config::default()
        };
        assert_eq!(config.endpoint(), "https://devnet.helius-rpc.com/?api-key=k3y");

        config.rpc_url = "https://rpc.example/?cluster=devnet".into();
        assert_eq!(config.endpoint(), "https://rpc.example/?cluster=devnet&api-key=k3y");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            api_key = "abc"
            commitment = "confirmed"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key, "abc");
        assert_eq!(config.commitment, CommitmentLevel::Confirmed);
        assert_eq!(config.rpc_url, default_rpc_url());
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "decimals = 6\nmint = \"So11111111111111111111111111111111111111112\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.decimals, 6);
        assert!(config.mint_pubkey().unwrap().is_some());
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_RPC_URL, "http://127.0.0.1:8899"),
            (ENV_API_KEY, "from-env"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.endpoint(), "http://127.0.0.1:8899?api-key=from-env");
        assert_eq!(config.mint, None);
    }

    #[test]
    fn later_layers_replace_a_bad_environment_mint() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let vars: HashMap<&str, &str> = [(ENV_MINT, "YOUR_MINT_PUBLIC_KEY_HERE")]
            .into_iter()
            .collect();

        let mut config =
            Config::load_with(Some(file.path()), |name| vars.get(name).map(|v| v.to_string()))
                .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMint(_))));

        config.mint = Some("So11111111111111111111111111111111111111112".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad_url = Config {
            rpc_url: "devnet".into(),
            ..Config::default()
        };
        assert!(matches!(bad_url.validate(), Err(ConfigError::InvalidRpcUrl(_))));

        let bad_mint = Config {
            mint: Some("YOUR_MINT_PUBLIC_KEY_HERE".into()),
            ..Config::default()
        };
        assert!(matches!(bad_mint.validate(), Err(ConfigError::InvalidMint(_))));

        let bad_poll = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert!(bad_poll.validate().is_err());
    }

    #[test]
    fn confirm_options_from_config() {
        let options = Config::default().confirm_options();
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.poll_interval, Duration::from_millis(500));
    }
}
