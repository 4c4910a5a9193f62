//! Configuration Management
//!
//! Reads persistent, non-secret configuration for intune-assign.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::app::DEFAULT_CONCURRENCY;
use crate::graph::auth::DEFAULT_AUTHORITY_HOST;
use crate::graph::client::DEFAULT_GRAPH_BASE_URL;

/// User configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Entra ID tenant (GUID or domain)
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// App registration client ID
    #[serde(default)]
    pub client_id: Option<String>,
    /// Graph endpoint override (national clouds, testing)
    #[serde(default)]
    pub graph_base_url: Option<String>,
    /// Token authority override
    #[serde(default)]
    pub authority_host: Option<String>,
    /// Directory for derived export file names
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    /// Resources processed at once within a category
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("intune-assign").join("config.json"))
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a file; missing or malformed files give defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Get effective tenant (CLI > env > config)
    pub fn effective_tenant(&self, cli: Option<&str>) -> Option<String> {
        first_non_empty(cli, "AZURE_TENANT_ID", self.tenant_id.as_deref())
    }

    /// Get effective client ID (CLI > env > config)
    pub fn effective_client_id(&self, cli: Option<&str>) -> Option<String> {
        first_non_empty(cli, "AZURE_CLIENT_ID", self.client_id.as_deref())
    }

    pub fn effective_graph_base_url(&self) -> String {
        self.graph_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GRAPH_BASE_URL.to_string())
    }

    pub fn effective_authority_host(&self) -> String {
        self.authority_host
            .clone()
            .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string())
    }

    /// Get effective concurrency (CLI > config > default), never below one
    pub fn effective_concurrency(&self, cli: Option<usize>) -> usize {
        cli.or(self.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY)
            .max(1)
    }
}

fn first_non_empty(cli: Option<&str>, env_key: &str, config: Option<&str>) -> Option<String> {
    cli.map(|s| s.to_string())
        .or_else(|| std::env::var(env_key).ok())
        .or_else(|| config.map(|s| s.to_string()))
        .filter(|s| !s.trim().is_empty())
}
