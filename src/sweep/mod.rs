//! Sweep definition loading
//!
//! A sweep definition is a W&B sweep YAML. Only two scalar fields matter to
//! the controller, `project:` and `name:`; the rest of the document is opaque
//! and passed through to the wandb CLI untouched. Extraction is a first-match
//! line scan, not a YAML parse, mirroring what the wandb CLI itself accepts.

use crate::{Result, SweepCtlError};
use std::fs;
use std::path::{Path, PathBuf};

/// The two fields sweepctl reads out of a sweep definition file
#[derive(Debug, Clone)]
pub struct SweepDefinition {
    /// W&B project the sweep belongs to
    pub project: String,
    /// Sweep name, used as the cluster resource naming stem
    pub name: String,
    /// Where the definition was read from
    pub path: PathBuf,
}

impl SweepDefinition {
    /// Load a definition file and extract its `project` and `name` fields.
    ///
    /// A missing file or a missing field is fatal; both are static,
    /// correctable input errors with no retry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SweepCtlError::FileMissing(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;

        let project = extract_field(&content, "project").ok_or_else(|| {
            SweepCtlError::MissingField {
                field: "project".to_string(),
                path: path.to_path_buf(),
            }
        })?;
        let name =
            extract_field(&content, "name").ok_or_else(|| SweepCtlError::MissingField {
                field: "name".to_string(),
                path: path.to_path_buf(),
            })?;

        tracing::debug!(project = %project, name = %name, "Sweep definition loaded");

        Ok(Self {
            project,
            name,
            path: path.to_path_buf(),
        })
    }

    /// Cluster resource naming stem derived from the sweep name
    pub fn resource_prefix(&self) -> String {
        format!("sweep-{}", self.name)
    }
}

/// Extract a top-level scalar field from a YAML document by line scanning.
///
/// Takes the first line beginning with `<field>:`, returns its second
/// whitespace-separated token with surrounding quotes stripped. Returns
/// `None` when no line matches or the value token is absent.
pub fn extract_field(doc: &str, field: &str) -> Option<String> {
    let marker = format!("{}:", field);
    let line = doc.lines().find(|l| l.starts_with(&marker))?;
    let value = line.split_whitespace().nth(1)?;
    let value = value.trim_matches(|c| c == '"' || c == '\'').trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
