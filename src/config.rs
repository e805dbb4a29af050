//! Configuration Management
//!
//! Handles persistent configuration storage for harborctl, with
//! flag > environment > config file resolution for every setting.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Harbor base URL
    #[serde(default)]
    pub url: Option<String>,
    /// Harbor username
    #[serde(default)]
    pub username: Option<String>,
    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: Option<bool>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("harborctl").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk. The password is deliberately never
    /// persisted; pass it via HARBOR_PASSWORD or --password.
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective base URL (env > config)
    pub fn effective_url(&self) -> Option<String> {
        env_var("HARBOR_URL").or_else(|| self.url.clone())
    }

    /// Get effective username (env > config)
    pub fn effective_username(&self) -> Option<String> {
        env_var("HARBOR_USERNAME").or_else(|| self.username.clone())
    }

    /// Get effective password (env only; never stored)
    pub fn effective_password(&self) -> Option<String> {
        env_var("HARBOR_PASSWORD")
    }

    /// Get effective insecure-TLS flag (env > config > false)
    pub fn effective_insecure(&self) -> bool {
        env_var("HARBOR_INSECURE")
            .map(|v| parse_bool(&v))
            .or(self.insecure)
            .unwrap_or(false)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Lenient boolean parsing for environment values
fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_truthy_values() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool("YES"));
        assert!(parse_bool(" on "));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("nonsense"));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = Config {
            url: Some("https://registry.example.com".to_string()),
            username: Some("admin".to_string()),
            insecure: Some(true),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.url.as_deref(), Some("https://registry.example.com"));
        assert_eq!(back.username.as_deref(), Some("admin"));
        assert_eq!(back.insecure, Some(true));
    }

    #[test]
    fn missing_fields_default_to_none() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.url.is_none());
        assert!(config.username.is_none());
        assert!(config.insecure.is_none());
    }
}
