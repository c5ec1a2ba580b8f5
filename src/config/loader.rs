//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ServerConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8080");
        assert!(!config.dev);
        assert_eq!(config.static_dir, "static");
        assert_eq!(config.shield.rate_limit, 180);
        assert_eq!(config.shield.window_secs, 60);
        assert_eq!(config.vendor.route, "/");
        assert!(config.vendor.assets.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            dev = true
            static_dir = "public"

            [listener]
            bind_address = "127.0.0.1:3000"

            [shield]
            rate_limit = 50
            window_secs = 30

            [vendor]
            route = "/vendor"

            [vendor.assets]
            "alpinejs.mjs" = "https://esm.sh/alpinejs@3.15.4/es2024/alpinejs.mjs"
        "#;
        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert!(config.dev);
        assert_eq!(config.static_dir, "public");
        assert_eq!(config.shield.rate_limit, 50);
        assert_eq!(config.vendor.route, "/vendor");
        assert_eq!(
            config.vendor.assets.get("alpinejs.mjs").unwrap(),
            "https://esm.sh/alpinejs@3.15.4/es2024/alpinejs.mjs"
        );
    }
}
