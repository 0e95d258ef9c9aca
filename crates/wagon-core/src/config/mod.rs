mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::WagonError;
use defaults::*;

/// Top-level Wagon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub wagon: WagonConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub campaign: CampaignConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WagonConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for WagonConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// HTTP server config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Authentication config. Tokens are bearer JWTs; expiry is the only
/// invalidation mechanism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens. Must be set for production use.
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: default_token_ttl_hours(),
        }
    }
}

/// Relational store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// WhatsApp session config.
///
/// Session data is stored at `{data_dir}/whatsapp_session/`.
/// Pairing is done by scanning a QR code (like WhatsApp Web).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Device name shown in the phone's linked-devices list.
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Country code prefixed to phone numbers that arrive without one.
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
    /// Seconds to wait for QR pairing before the session is marked timed out.
    #[serde(default = "default_pairing_timeout_secs")]
    pub pairing_timeout_secs: u64,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            device_name: default_device_name(),
            default_country_code: default_country_code(),
            pairing_timeout_secs: default_pairing_timeout_secs(),
        }
    }
}

/// Campaign scheduler config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// How often (seconds) the scheduler scans for due campaigns.
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            poll_secs: default_poll_secs(),
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file. A missing file yields defaults.
pub fn load(path: &str) -> Result<Config, WagonError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| WagonError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| WagonError::Config(format!("failed to parse config: {e}")))?;

    Ok(config)
}
