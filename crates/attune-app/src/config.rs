//! Demo configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::info;

use attune_core::TransportContext;
use attune_sim::SimConfig;

/// Demo configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Application settings
    #[serde(default)]
    pub app: AppConfig,
    /// Device settings
    #[serde(default)]
    pub device: DeviceConfig,
    /// Simulated headset settings
    #[serde(default)]
    pub sim: SimSettings,
}

/// Application-level settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { log_level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Models that participate in telemetry and button features
    #[serde(default = "default_supported_models")]
    pub supported_models: Vec<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { supported_models: default_supported_models() }
    }
}

fn default_supported_models() -> Vec<String> {
    vec!["Aria 40".to_string(), "Aria 50".to_string(), "Aria 50 II".to_string()]
}

/// Simulated headset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSettings {
    /// Device model name
    #[serde(default = "default_model")]
    pub model: String,
    /// Device serial number
    #[serde(default = "default_serial")]
    pub serial_number: String,
    /// USB product ID (hex)
    #[serde(default = "default_pid")]
    pub product_id: String,
    /// Transport context presented at startup
    #[serde(default = "default_transport")]
    pub transport: TransportContext,
    /// Delay before the simulated device attaches
    #[serde(default = "default_attach_delay_ms")]
    pub attach_delay_ms: u64,
    /// Run the scripted telemetry scenario
    #[serde(default = "default_true")]
    pub scenario: bool,
    /// Whether the device supports button customization
    #[serde(default = "default_true")]
    pub buttons_supported: bool,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            serial_number: default_serial(),
            product_id: default_pid(),
            transport: default_transport(),
            attach_delay_ms: default_attach_delay_ms(),
            scenario: true,
            buttons_supported: true,
        }
    }
}

fn default_model() -> String {
    "Aria 50".to_string()
}

fn default_serial() -> String {
    "SIM-0001".to_string()
}

fn default_pid() -> String {
    "24c8".to_string()
}

fn default_transport() -> TransportContext {
    TransportContext::Direct
}

fn default_attach_delay_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl SimSettings {
    /// Build the simulator configuration.
    ///
    /// # Errors
    /// Fails when the product ID is not valid hex.
    pub fn to_sim_config(&self) -> Result<SimConfig> {
        let product_id = u16::from_str_radix(&self.product_id, 16)
            .with_context(|| format!("Invalid product ID: {}", self.product_id))?;
        Ok(SimConfig {
            name: self.model.clone(),
            product_id,
            serial_number: self.serial_number.clone(),
            transport_context: self.transport,
            attach_delay: Duration::from_millis(self.attach_delay_ms),
            buttons_supported: self.buttons_supported,
            scenario: self.scenario,
        })
    }
}

/// Load configuration from file or defaults.
pub fn load_config() -> Result<Config> {
    let config_path = config_path()?;

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {config_path:?}"))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {config_path:?}"))?;
        Ok(config)
    } else {
        info!(?config_path, "Config file not found, using defaults");
        Ok(Config::default())
    }
}

/// Get the configuration file path.
fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "attune", "Attune")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.toml"))
}
