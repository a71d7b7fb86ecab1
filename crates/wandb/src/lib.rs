//! Weights & Biases (wandb) sweep CLI wrapper for Rust
//!
//! A thin, typed interface to the `wandb` CLI for creating hyperparameter
//! sweeps and recovering their identifiers from the command's human-readable
//! output.
//!
//! # Example
//!
//! ```no_run
//! use wandb::Wandb;
//!
//! let wb = Wandb::new("research-team")?;
//!
//! // Create a sweep from a definition file
//! let handle = wb.create_sweep("sweep.yaml".as_ref(), "my-project")?;
//! println!("Sweep id: {}", handle.sweep_id);
//!
//! // Build the dashboard URL
//! let url = wandb::sweep_url("research-team", "my-project", &handle.sweep_id);
//! # Ok::<(), wandb::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Errors that can occur when interacting with wandb
#[derive(Error, Debug)]
pub enum Error {
    #[error("wandb is not installed or not in PATH")]
    NotInstalled,

    #[error("Failed to execute wandb command: {0}")]
    CommandFailed(String),

    #[error("Could not recover a sweep id from wandb output:\n{0}")]
    SweepIdNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for wandb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Captured output of a wandb invocation
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Combined stdout and stderr, in that order
    pub fn combined(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Result of a successful sweep submission
#[derive(Debug, Clone)]
pub struct SweepHandle {
    /// Short alphanumeric sweep identifier
    pub sweep_id: String,
    /// Raw combined output the id was recovered from
    pub raw_output: String,
}

/// wandb CLI wrapper
#[derive(Debug, Clone, Default)]
pub struct Wandb {
    /// Account (entity) all sweeps are created under
    entity: String,
    /// Working directory
    workdir: Option<PathBuf>,
}

impl Wandb {
    /// Create a new Wandb instance for the given entity
    pub fn new(entity: impl Into<String>) -> Result<Self> {
        let wb = Self {
            entity: entity.into(),
            workdir: None,
        };
        if !wb.is_available() {
            return Err(Error::NotInstalled);
        }
        Ok(wb)
    }

    /// Create with a specific working directory
    pub fn with_workdir(entity: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            entity: entity.into(),
            workdir: Some(path.into()),
        }
    }

    /// The entity sweeps are created under
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Check if wandb is available
    pub fn is_available(&self) -> bool {
        self.run_command(&["--version"])
            .map(|out| out.success)
            .unwrap_or(false)
    }

    /// Create a sweep from a definition file and recover its id.
    ///
    /// The wandb CLI reports the sweep id as free-form text, not as a
    /// committed output format, so the combined stdout/stderr is captured
    /// regardless of exit status and scanned with [`extract_sweep_id`].
    pub fn create_sweep(&self, sweep_file: &Path, project: &str) -> Result<SweepHandle> {
        let file = sweep_file.to_string_lossy();
        let output = self.run_command(&[
            "sweep",
            file.as_ref(),
            "--entity",
            &self.entity,
            "--project",
            project,
        ])?;

        let combined = output.combined();
        match extract_sweep_id(&combined) {
            Some(sweep_id) => Ok(SweepHandle {
                sweep_id,
                raw_output: combined,
            }),
            None => Err(Error::SweepIdNotFound(combined)),
        }
    }

    /// Run a wandb command, capturing output without failing on a non-zero
    /// exit status. Spawn errors are the only hard failure here.
    fn run_command(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut cmd = Command::new("wandb");
        cmd.args(args);

        if let Some(ref dir) = self.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .map_err(|e| Error::CommandFailed(format!("wandb {}: {}", args.join(" "), e)))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Build the dashboard URL for a sweep
pub fn sweep_url(entity: &str, project: &str, sweep_id: &str) -> String {
    format!("https://wandb.ai/{}/{}/sweeps/{}", entity, project, sweep_id)
}

/// Recover a sweep id from wandb's free-form output.
///
/// Tries three matchers in decreasing order of specificity and returns the
/// first hit: the `wandb agent entity/project/<id>` hint line, then a
/// `/sweeps/<id>` dashboard URL, then the last standalone alphanumeric token
/// of length >= 8 anywhere in the output.
pub fn extract_sweep_id(output: &str) -> Option<String> {
    match_agent_line(output)
        .or_else(|| match_sweep_url(output))
        .or_else(|| match_trailing_token(output))
}

/// Match the `wandb agent <entity>/<project>/<id>` hint and take the
/// trailing path segment
pub fn match_agent_line(output: &str) -> Option<String> {
    let tokens: Vec<&str> = output.split_whitespace().collect();
    for pair in tokens.windows(2) {
        if pair[0] != "agent" {
            continue;
        }
        let parts: Vec<&str> = pair[1].split('/').collect();
        if parts.len() < 3 {
            continue;
        }
        let id = parts[parts.len() - 1];
        if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Some(id.to_string());
        }
    }
    None
}

/// Match a `.../sweeps/<id>` URL and take the trailing segment
pub fn match_sweep_url(output: &str) -> Option<String> {
    for token in output.split_whitespace() {
        let Some(pos) = token.find("/sweeps/") else {
            continue;
        };
        let tail = &token[pos + "/sweeps/".len()..];
        let id: String = tail
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if !id.is_empty() {
            return Some(id);
        }
    }
    None
}

/// Match the last standalone alphanumeric token of length >= 8
pub fn match_trailing_token(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .filter(|t| t.len() >= 8 && t.chars().all(|c| c.is_ascii_alphanumeric()))
        .last()
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_line_match() {
        let output = "wandb: Created sweep.\nwandb: Run: wandb agent acct/proj/AB12CD34\n";
        assert_eq!(match_agent_line(output), Some("AB12CD34".to_string()));
        assert_eq!(extract_sweep_id(output), Some("AB12CD34".to_string()));
    }

    #[test]
    fn test_agent_line_requires_three_segments() {
        // "agent" followed by something that is not entity/project/id
        let output = "run the agent now";
        assert_eq!(match_agent_line(output), None);
    }

    #[test]
    fn test_sweep_url_match() {
        let output = "View sweep at: https://service/acct/proj/sweeps/XY98ZZ77";
        assert_eq!(match_sweep_url(output), Some("XY98ZZ77".to_string()));
        assert_eq!(extract_sweep_id(output), Some("XY98ZZ77".to_string()));
    }

    #[test]
    fn test_sweep_url_strips_trailing_punctuation() {
        let output = "see https://wandb.ai/a/b/sweeps/abc123xy.";
        assert_eq!(match_sweep_url(output), Some("abc123xy".to_string()));
    }

    #[test]
    fn test_trailing_token_fallback() {
        let output = "some output\nwith no recognizable pattern\nid: q1w2e3r4t5";
        assert_eq!(match_trailing_token(output), Some("q1w2e3r4t5".to_string()));
        assert_eq!(extract_sweep_id(output), Some("q1w2e3r4t5".to_string()));
    }

    #[test]
    fn test_trailing_token_takes_last() {
        let output = "first12345 middle\nsecond9876";
        assert_eq!(match_trailing_token(output), Some("second9876".to_string()));
    }

    #[test]
    fn test_trailing_token_ignores_short_and_punctuated() {
        let output = "short abc http://x/y tokens! only.";
        assert_eq!(match_trailing_token(output), None);
        assert_eq!(extract_sweep_id(output), None);
    }

    #[test]
    fn test_agent_line_wins_over_url() {
        let output = "wandb agent acct/proj/AGENTID1\nhttps://wandb.ai/acct/proj/sweeps/URLID222";
        assert_eq!(extract_sweep_id(output), Some("AGENTID1".to_string()));
    }

    #[test]
    fn test_sweep_url_builder() {
        assert_eq!(
            sweep_url("acct", "proj", "AB12CD34"),
            "https://wandb.ai/acct/proj/sweeps/AB12CD34"
        );
    }

    #[test]
    fn test_combined_output() {
        let out = CommandOutput {
            success: false,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(out.combined(), "out\nerr");

        let only_err = CommandOutput {
            success: false,
            stdout: String::new(),
            stderr: "err".to_string(),
        };
        assert_eq!(only_err.combined(), "err");
    }
}
