//! Configuration file loading
//!
//! The configuration is a TOML file with a required `[participants]` table
//! (name = address, in draw order) and optional `[email]` and `[general]`
//! tables whose keys all fall back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Problems found while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Please specify a config file")]
    MissingPath,
    #[error("Config file {} not readable", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config file is missing key: {0}")]
    MissingKey(&'static str),
    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TlsMode {
    /// Plain connection, no TLS
    #[default]
    #[serde(rename = "none")]
    Plain,
    /// Plain connection upgraded with STARTTLS
    #[serde(rename = "starttls")]
    Starttls,
    /// Implicit TLS from the first byte
    #[serde(rename = "tls")]
    Tls,
}

/// `[email]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Display name used in the `From` header and to sign messages
    #[serde(rename = "from")]
    pub from_name: String,
    /// Sender address; falls back to `smtp_username` when unset
    pub from_address: Option<String>,
    pub send_email: bool,
    /// Organiser address that receives the full list
    pub summary_email: Option<String>,
    pub tls: TlsMode,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "localhost".to_string(),
            smtp_port: 25,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_name: String::new(),
            from_address: None,
            send_email: false,
            summary_email: None,
            tls: TlsMode::Plain,
        }
    }
}

impl EmailConfig {
    /// Authentication is attempted only when both username and password are set.
    pub fn uses_auth(&self) -> bool {
        !self.smtp_username.is_empty() && !self.smtp_password.is_empty()
    }

    pub fn sender_address(&self) -> Option<&str> {
        non_empty(self.from_address.as_deref()).or(non_empty(Some(self.smtp_username.as_str())))
    }

    pub fn summary_address(&self) -> Option<&str> {
        non_empty(self.summary_email.as_deref())
    }
}

/// `[general]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub debug: bool,
    /// Number of times to run the draw; above 1 no email is ever sent
    pub runs: usize,
    /// Fixed RNG seed for reproducible draws
    pub seed: Option<u64>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            debug: false,
            runs: 1,
            seed: None,
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct SantaConfig {
    /// Participant name to email address, in file order
    pub participants: IndexMap<String, String>,
    pub email: EmailConfig,
    pub general: GeneralConfig,
}

#[derive(Deserialize)]
struct RawConfig {
    participants: Option<IndexMap<String, String>>,
    #[serde(default)]
    email: EmailConfig,
    #[serde(default)]
    general: GeneralConfig,
}

impl SantaConfig {
    /// Read and parse a configuration file. Does not validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(raw)?;
        let participants = raw
            .participants
            .ok_or(ConfigError::MissingKey("participants"))?;

        Ok(Self {
            participants,
            email: raw.email,
            general: raw.general,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.participants.len() < 2 {
            return Err(ConfigError::Invalid(format!(
                "at least 2 participants are required, found {}",
                self.participants.len()
            )));
        }

        if let Some((name, _)) = self
            .participants
            .iter()
            .find(|(name, address)| name.trim().is_empty() || address.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "participant {name:?} must have a non-empty name and address"
            )));
        }

        if self.general.runs == 0 {
            return Err(ConfigError::Invalid(
                "runs must be greater than zero".to_string(),
            ));
        }

        if self.email.smtp_server.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "smtp_server must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Statistics mode never sends, whatever `send_email` says.
    pub fn sending_enabled(&self) -> bool {
        self.email.send_email && self.general.runs == 1
    }

    pub fn address_of(&self, name: &str) -> Option<&str> {
        self.participants.get(name).map(String::as_str)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
