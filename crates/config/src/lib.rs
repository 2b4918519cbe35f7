//! Runtime configuration for the labdesk shell.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML config file
//! under the platform config directory, environment overrides for the two
//! backend addresses. The serial, camera and ui sections are opaque
//! passthrough for the shell; the client layer only consumes `api`.

use std::env;
use std::path::PathBuf;

use eyre::{OptionExt, Result, WrapErr};
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

pub const CONFIG_FILE: &str = "config.toml";

/// Environment override for the prediction service address.
pub const ENV_PREDICTION_URL: &str = "LABDESK_PREDICTION_URL";

/// Environment override for the application service address.
pub const ENV_APPLICATION_URL: &str = "LABDESK_APPLICATION_URL";

const DEFAULT_PREDICTION_URL: &str = "http://localhost:5000";
const DEFAULT_APPLICATION_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub serial: SerialConfig,
    pub camera: CameraConfig,
    pub ui: UiConfig,
}

/// Canonical dual-backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub prediction_url: Url,
    pub application_url: Url,
    pub timeout_ms: u64,
    pub retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prediction_url: Url::parse(DEFAULT_PREDICTION_URL).expect("default URL is valid"),
            application_url: Url::parse(DEFAULT_APPLICATION_URL).expect("default URL is valid"),
            timeout_ms: 30_000,
            retries: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: String,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: "none".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_rate: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
    pub locale: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_owned(),
            locale: "zh-CN".to_owned(),
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    /// A missing file yields the defaults.
    pub async fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?).await
    }

    pub async fn load_from(path: PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)
                .await
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;

            toml::from_str(&contents).wrap_err("invalid config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        self.save_to(Self::config_path()?).await
    }

    pub async fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let contents = toml::to_string_pretty(self)?;

        fs::write(&path, contents)
            .await
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_eyre("could not find config directory")?;

        Ok(config_dir.join("labdesk").join(CONFIG_FILE))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = env::var(ENV_PREDICTION_URL) {
            self.api.prediction_url = value
                .parse()
                .wrap_err_with(|| format!("invalid {ENV_PREDICTION_URL}"))?;
        }

        if let Ok(value) = env::var(ENV_APPLICATION_URL) {
            self.api.application_url = value
                .parse()
                .wrap_err_with(|| format!("invalid {ENV_APPLICATION_URL}"))?;
        }

        Ok(())
    }
}
