//! Configuration system
//!
//! Loads ~/.config/sweepctl/config.yaml with support for:
//! - The W&B entity all sweeps are created under
//! - The cluster namespace agents deploy into
//! - Sweep definition and manifest template paths
//! - Fan-out defaults (agent count, log-tail delay)
//!
//! Every field has a working default, so a missing config file is not an
//! error; `load_default` falls back to `Default` in that case.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// sweepctl configuration
///
/// Represents the complete ~/.config/sweepctl/config.yaml file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepCtlConfig {
    /// W&B account (entity) sweeps are created under
    #[serde(default = "default_entity")]
    pub entity: String,

    /// Cluster namespace agents are deployed into
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Path to the sweep definition file
    #[serde(default = "default_sweep_file")]
    pub sweep_file: PathBuf,

    /// Manifest template for pod-kind deployments
    #[serde(default = "default_pod_template")]
    pub pod_template: PathBuf,

    /// Manifest template for job-kind deployments
    #[serde(default = "default_job_template")]
    pub job_template: PathBuf,

    /// Number of agents to deploy when none is given on the command line
    #[serde(default = "default_agents")]
    pub default_agents: u32,

    /// Seconds to wait before tailing the last deployed agent's logs
    #[serde(default = "default_log_wait_secs")]
    pub log_wait_secs: u64,
}

fn default_entity() -> String {
    "research-team".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_sweep_file() -> PathBuf {
    PathBuf::from("sweep.yaml")
}

fn default_pod_template() -> PathBuf {
    PathBuf::from("sweep-pod-template.yml")
}

fn default_job_template() -> PathBuf {
    PathBuf::from("sweep-job-template.yml")
}

fn default_agents() -> u32 {
    4
}

fn default_log_wait_secs() -> u64 {
    10
}

impl SweepCtlConfig {
    /// Create a configuration with all defaults
    pub fn new() -> Self {
        Self {
            entity: default_entity(),
            namespace: default_namespace(),
            sweep_file: default_sweep_file(),
            pod_template: default_pod_template(),
            job_template: default_job_template(),
            default_agents: default_agents(),
            log_wait_secs: default_log_wait_secs(),
        }
    }

    /// Load configuration from the default path, falling back to defaults
    /// when no config file exists
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::new());
        }
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::SweepCtlError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading sweepctl configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving sweepctl configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/sweepctl/config.yaml)
    pub fn default_path() -> PathBuf {
        // Always use ~/.config for consistency across platforms (macOS, Linux)
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("sweepctl");
        path.push("config.yaml");
        path
    }
}

impl Default for SweepCtlConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SweepCtlConfig::new();
        assert_eq!(config.default_agents, 4);
        assert_eq!(config.namespace, "default");
        assert_eq!(config.sweep_file, PathBuf::from("sweep.yaml"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");

        let mut config = SweepCtlConfig::new();
        config.entity = "ml-lab".to_string();
        config.namespace = "training".to_string();
        config.default_agents = 8;

        config.save(&path).unwrap();

        let loaded = SweepCtlConfig::load(&path).unwrap();
        assert_eq!(loaded.entity, "ml-lab");
        assert_eq!(loaded.namespace, "training");
        assert_eq!(loaded.default_agents, 8);
        // Unspecified fields keep their defaults
        assert_eq!(loaded.log_wait_secs, 10);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "entity: someone-else\n").unwrap();

        let loaded = SweepCtlConfig::load(&path).unwrap();
        assert_eq!(loaded.entity, "someone-else");
        assert_eq!(loaded.default_agents, 4);
        assert_eq!(loaded.pod_template, PathBuf::from("sweep-pod-template.yml"));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = SweepCtlConfig::load("/nonexistent/config.yaml");
        assert!(result.is_err());
    }
}
