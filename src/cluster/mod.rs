//! kubectl wrapper
//!
//! A thin, typed interface to the `kubectl` CLI. The control plane is a
//! black box here: sweepctl only lists resources, applies manifest files,
//! and streams logs, all as blocking subprocess calls.

use crate::{Result, SweepCtlError};
use std::path::Path;
use std::process::{Command, Stdio};

/// Captured output of a kubectl invocation
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// kubectl CLI wrapper, pinned to one namespace
#[derive(Debug, Clone)]
pub struct Kubectl {
    namespace: String,
}

impl Kubectl {
    /// Create a new Kubectl instance for the given namespace
    pub fn new(namespace: impl Into<String>) -> Result<Self> {
        if !Self::is_available() {
            return Err(SweepCtlError::ToolMissing("kubectl".to_string()));
        }
        Ok(Self {
            namespace: namespace.into(),
        })
    }

    /// The namespace all commands run against
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Check if kubectl is available
    pub fn is_available() -> bool {
        Command::new("kubectl")
            .args(["version", "--client"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// List resources of a kind, returning the raw tabular output
    pub fn get(&self, kind: &str) -> Result<CommandOutput> {
        self.run_command(&["get", kind, "-n", &self.namespace])
    }

    /// List the names of resources of a kind.
    ///
    /// Parses the first column of `kubectl get`, skipping the header line.
    pub fn resource_names(&self, kind: &str) -> Result<Vec<String>> {
        let output = self.get(kind)?;
        if !output.success {
            return Err(SweepCtlError::Cluster(format!(
                "kubectl get {} failed: {}",
                kind,
                output.stderr.trim()
            )));
        }

        Ok(parse_name_column(&output.stdout))
    }

    /// Apply a manifest file
    pub fn apply(&self, file: &Path) -> Result<CommandOutput> {
        let file = file.to_string_lossy();
        self.run_command(&["apply", "-f", file.as_ref(), "-n", &self.namespace])
    }

    /// Stream logs from a resource until interrupted.
    ///
    /// Output goes straight to the terminal; this call blocks for as long
    /// as the log stream stays open.
    pub fn logs_follow(&self, resource: &str) -> Result<()> {
        let status = Command::new("kubectl")
            .args(["logs", resource, "-n", &self.namespace, "-f"])
            .status()
            .map_err(|e| SweepCtlError::Cluster(format!("kubectl logs {}: {}", resource, e)))?;

        if !status.success() {
            tracing::warn!(resource = %resource, "Log stream ended with a non-zero status");
        }
        Ok(())
    }

    fn run_command(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new("kubectl")
            .args(args)
            .output()
            .map_err(|e| SweepCtlError::Cluster(format!("kubectl {}: {}", args.join(" "), e)))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Extract the NAME column from `kubectl get` tabular output
fn parse_name_column(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .skip_while(|l| l.starts_with("NAME"))
        .filter_map(|l| l.split_whitespace().next())
        .map(|n| n.to_string())
        .collect()
}
