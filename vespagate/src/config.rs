//! Configuration for the gateway
//!
//! Loaded from a TOML file; every field has a default so an empty file
//! (or no file at all) yields a working local setup.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub vespa: VespaConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Path prefix stripped before dispatch, e.g. "/opensearch"
    #[serde(default)]
    pub path_prefix: String,
    /// Maximum request body size in bytes (default: 100MB)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_bind_addr() -> String {
    "127.0.0.1:9200".to_string()
}

fn default_max_body_size() -> usize {
    100 * 1024 * 1024 // 100MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            path_prefix: String::new(),
            max_body_size: default_max_body_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VespaConfig {
    /// Base URL of the Vespa container endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Document type used in document/v1 paths
    #[serde(default = "default_document_type")]
    pub document_type: String,
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_document_type() -> String {
    "doc".to_string()
}

impl Default for VespaConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            document_type: default_document_type(),
        }
    }
}

impl GatewayConfig {
    /// Load config from file path, or create default
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: GatewayConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = GatewayConfig::default();
            // Try to save default config
            if let Some(parent) = config_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = config.save(config_path);
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}
