//! Configuration file support for netautoctl
//!
//! Loads and validates settings from a TOML file.
//! Default location: /etc/netauto/netautoctl.toml

use anyhow::{bail, Context, Result};
use netauto_render::{PlatformContext, PlatformFamily};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/netauto/netautoctl.toml";

/// Target platform configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Platform family ("eos" or "ocnos")
    #[serde(default = "default_family")]
    pub family: String,

    /// Override of the family's LAG name prefix
    #[serde(default)]
    pub lag_prefix: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Device host the session targets
    #[serde(default = "default_host")]
    pub host: String,

    /// Push as dry runs unless overridden on the command line
    #[serde(default)]
    pub dry_run: bool,
}

/// Complete netautoctl configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtlConfig {
    #[serde(default)]
    pub platform: PlatformConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

// Default functions
fn default_family() -> String {
    "eos".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    netauto_session::MOCK_HOST.to_string()
}

// Default implementations
impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            family: default_family(),
            lag_prefix: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            dry_run: false,
        }
    }
}

impl CtlConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn family(&self) -> Result<PlatformFamily> {
        Ok(self.platform.family.parse::<PlatformFamily>()?)
    }

    /// Renderer context of the configured family, prefix override applied
    pub fn context(&self) -> Result<PlatformContext> {
        let mut context = self.family()?.context();
        if let Some(prefix) = &self.platform.lag_prefix {
            context.lag_prefix = prefix.clone();
        }
        Ok(context)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.family()?;
        if self.session.host.trim().is_empty() {
            bail!("session.host must not be empty");
        }
        if matches!(&self.platform.lag_prefix, Some(prefix) if prefix.trim().is_empty()) {
            bail!("platform.lag_prefix must not be empty when set");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CtlConfig::default();
        assert_eq!(config.platform.family, "eos");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.session.host, "mock");
        assert!(!config.session.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_deserialization() {
        let config: CtlConfig = toml::from_str(
            r#"
            [platform]
            family = "ocnos"
            lag_prefix = "lag"

            [session]
            host = "leaf2"
            "#,
        )
        .unwrap();
        assert_eq!(config.family().unwrap(), PlatformFamily::Ocnos);
        assert_eq!(config.context().unwrap().lag_prefix, "lag");
        assert_eq!(config.session.host, "leaf2");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_unknown_family() {
        let mut config = CtlConfig::default();
        config.platform.family = "junos".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netautoctl.toml");
        let mut config = CtlConfig::default();
        config.session.dry_run = true;
        config.save(&path).unwrap();
        assert_eq!(CtlConfig::load_or_default(&path).unwrap(), config);
    }

    #[test]
    fn test_load_nonexistent_file_defaults() {
        let config = CtlConfig::load_or_default("/nonexistent/netautoctl.toml").unwrap();
        assert_eq!(config, CtlConfig::default());
    }
}
