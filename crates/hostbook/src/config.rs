//! Configuration loading and types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration for hostbook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Inventory source files or directories
    #[serde(default)]
    pub inventory: Vec<PathBuf>,
    /// Limit expression handed to the inventory engine
    pub limit: Option<String>,
    /// Directories containing setup-module fact files
    #[serde(default)]
    pub fact_dirs: Vec<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Engine invocation timeout in seconds
    #[serde(default = "default_resolve_timeout")]
    pub resolve_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory: Vec::new(),
            limit: None,
            fact_dirs: Vec::new(),
            log_level: default_log_level(),
            resolve_timeout_secs: default_resolve_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_resolve_timeout() -> u64 {
    60
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &PathBuf) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from default paths or use defaults
    pub fn load_default() -> eyre::Result<Self> {
        // Check environment variable
        if let Ok(path) = std::env::var("HOSTBOOK_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        // Try common paths
        let paths = [
            PathBuf::from("hostbook.toml"),
            PathBuf::from("/etc/hostbook/hostbook.toml"),
            dirs::config_dir()
                .map(|p| p.join("hostbook/hostbook.toml"))
                .unwrap_or_default(),
        ];

        for path in paths {
            if path.exists() {
                return Self::load(&path);
            }
        }

        // Return default config if no file found
        tracing::warn!("no config file found, using defaults");
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            inventory = ["hosts.ini", "inventory/"]
            limit = "web*:&prod"
            fact_dirs = ["/var/lib/hostbook/facts"]
            log_level = "debug"
            resolve_timeout_secs = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.inventory.len(), 2);
        assert_eq!(config.limit.as_deref(), Some("web*:&prod"));
        assert_eq!(config.fact_dirs, vec![PathBuf::from("/var/lib/hostbook/facts")]);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.resolve_timeout_secs, 120);
    }

    #[test]
    fn test_defaults_apply() {
        let config: Config = toml::from_str("").unwrap();

        assert!(config.inventory.is_empty());
        assert!(config.limit.is_none());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.resolve_timeout_secs, 60);
    }
}
