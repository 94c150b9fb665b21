use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Config file not found at {0}")]
    NotFound(PathBuf),
}

/// Daemon configuration. Block-list settings live in the prefs store, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardianConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub presenter: PresenterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Package id of the guardian. Always excluded from blocking.
    #[serde(default = "default_package")]
    pub package: String,
    /// Accessibility service class, as listed in the enabled-services setting.
    #[serde(default = "default_service_class")]
    pub service_class: String,
    /// Device admin receiver component.
    #[serde(default = "default_admin_component")]
    pub admin_component: String,
    /// Connect on daemon start instead of waiting for a platform signal.
    #[serde(default = "default_autostart")]
    pub autostart: bool,
    /// Prefs reads slower than this count as "blocking disabled".
    #[serde(default = "default_read_timeout_ms")]
    pub config_read_timeout_ms: u64,
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_prefs_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenterConfig {
    /// Activity manager binary.
    #[serde(default = "default_program")]
    pub program: String,
    /// Blocking screen component.
    #[serde(default = "default_component")]
    pub component: String,
}

fn default_package() -> String {
    guardian_core::GUARDIAN_APP_ID.to_string()
}

fn default_service_class() -> String {
    "com.predator.app_guardian.AppBlockerService".to_string()
}

fn default_admin_component() -> String {
    "com.predator.app_guardian/.AppGuardianDeviceAdmin".to_string()
}

fn default_autostart() -> bool {
    true
}

fn default_read_timeout_ms() -> u64 {
    250
}

fn default_socket_path() -> PathBuf {
    PathBuf::from("/tmp/app-guardian.sock")
}

fn default_prefs_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/data/local/tmp"))
        .join("app-guardian")
        .join("prefs.toml")
}

fn default_program() -> String {
    "am".to_string()
}

fn default_component() -> String {
    "com.predator.app_guardian/.BlockerActivity".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            package: default_package(),
            service_class: default_service_class(),
            admin_component: default_admin_component(),
            autostart: default_autostart(),
            config_read_timeout_ms: default_read_timeout_ms(),
            socket_path: default_socket_path(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_prefs_path(),
        }
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            component: default_component(),
        }
    }
}

impl ServiceConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.config_read_timeout_ms)
    }
}

impl GuardianConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: GuardianConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("app-guardian")
            .join("config.toml")
    }
}
