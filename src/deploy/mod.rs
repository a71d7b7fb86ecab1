//! Agent fan-out
//!
//! Renders one manifest per agent from a template and applies each to the
//! cluster. A single agent's failure is reported and skipped; the loop never
//! aborts or rolls back. Rendered manifests are kept on disk and accumulate
//! across runs.

use crate::cluster::Kubectl;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// PVC slots 1 and 2 are reserved; agent ordinal i binds slot i + 2,
/// so indices start at 3.
pub const VOLUME_OFFSET: u32 = 2;

/// Upper bound on the per-run fan-out; larger counts from the command
/// line are clamped before any allocation or deploy happens.
pub const MAX_AGENTS: u32 = 256;

/// Template placeholders, replaced as exact substrings (all occurrences)
pub const PLACEHOLDER_RESOURCE_NAME: &str = "{RESOURCE_NAME}";
pub const PLACEHOLDER_SWEEP_ID: &str = "{SWEEP_ID}";
pub const PLACEHOLDER_PVC_NUM: &str = "{PVC_NUM}";
pub const PLACEHOLDER_PROJECT: &str = "{WANDB_PROJECT}";

/// Resource kind agents are deployed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeployMode {
    /// Bare pods (default)
    #[default]
    Pod,
    /// Kubernetes jobs
    Job,
}

impl DeployMode {
    /// Singular resource kind, as kubectl expects it
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pod => "pod",
            Self::Job => "job",
        }
    }

    /// Plural label, used as the rendered-manifest output directory
    pub fn plural(&self) -> &'static str {
        match self {
            Self::Pod => "pods",
            Self::Job => "jobs",
        }
    }

    /// Template path for this mode from the settings
    pub fn template_path<'a>(&self, config: &'a crate::config::SweepCtlConfig) -> &'a Path {
        match self {
            Self::Pod => &config.pod_template,
            Self::Job => &config.job_template,
        }
    }
}

impl std::fmt::Display for DeployMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// Parse the loose trailing command-line tokens.
///
/// `--job`/`--jobs` selects job-kind deployment; a non-negative integer sets
/// the agent count, with the last integer-like token winning. Anything else
/// is ignored. The winning count is clamped to [`MAX_AGENTS`].
pub fn parse_tokens(tokens: &[String]) -> (DeployMode, Option<u32>) {
    let mut mode = DeployMode::Pod;
    let mut agents = None;

    for token in tokens {
        match token.as_str() {
            "--job" | "--jobs" => mode = DeployMode::Job,
            other => {
                if let Ok(n) = other.parse::<u32>() {
                    agents = Some(n);
                }
            }
        }
    }

    (mode, agents.map(|n| n.min(MAX_AGENTS)))
}

/// Volume index for an agent ordinal (ordinals count from 1)
pub fn volume_index(ordinal: u32) -> u32 {
    ordinal + VOLUME_OFFSET
}

/// Cluster resource name for one agent
pub fn resource_name(sweep_name: &str, volume_index: u32) -> String {
    format!("sweep-{}-{}", sweep_name, volume_index)
}

/// Values substituted into a manifest template
#[derive(Debug, Clone)]
pub struct ManifestVars<'a> {
    pub resource_name: &'a str,
    pub sweep_id: &'a str,
    pub volume_index: u32,
    pub project: &'a str,
}

/// Render a template by exact substring substitution.
///
/// Every occurrence of each placeholder is replaced; placeholders absent
/// from the template are simply not substituted.
pub fn render_manifest(template: &str, vars: &ManifestVars<'_>) -> String {
    template
        .replace(PLACEHOLDER_RESOURCE_NAME, vars.resource_name)
        .replace(PLACEHOLDER_SWEEP_ID, vars.sweep_id)
        .replace(PLACEHOLDER_PVC_NUM, &vars.volume_index.to_string())
        .replace(PLACEHOLDER_PROJECT, vars.project)
}

/// Everything the pipeline stages need once the sweep exists.
///
/// One explicit record instead of state scattered across stages; the
/// reporter reads the last deployed resource from the outcome list, never
/// from leaked loop state.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// W&B entity the sweep was created under
    pub entity: String,
    /// W&B project from the sweep definition
    pub project: String,
    /// Sweep name from the definition, the resource naming stem
    pub sweep_name: String,
    /// Recovered sweep identifier
    pub sweep_id: String,
    /// Resource kind for this run
    pub mode: DeployMode,
    /// Number of agents to deploy
    pub agents: u32,
}

impl RunContext {
    /// Naming stem shared by all resources of this sweep
    pub fn resource_prefix(&self) -> String {
        format!("sweep-{}", self.sweep_name)
    }
}

/// Outcome of one agent's render-write-apply step
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub resource_name: String,
    pub volume_index: u32,
    pub manifest_path: PathBuf,
    /// Failure detail; `None` means the apply succeeded
    pub error: Option<String>,
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Deploy all agents for a run.
///
/// Renders, writes, and applies one manifest per ordinal, with manifests
/// written under `<out_root>/<kind-plural>/`. Per-item failures are recorded
/// in the returned list and do not stop the loop; only being unable to
/// create the output directory is fatal.
pub fn deploy_agents(
    kubectl: &Kubectl,
    ctx: &RunContext,
    template: &str,
    out_root: &Path,
) -> Result<Vec<DeployOutcome>> {
    let out_dir = out_root.join(ctx.mode.plural());
    fs::create_dir_all(&out_dir)?;

    let mut outcomes = Vec::with_capacity(ctx.agents as usize);

    for ordinal in 1..=ctx.agents {
        let volume_index = volume_index(ordinal);
        let resource_name = resource_name(&ctx.sweep_name, volume_index);
        let manifest_path = out_dir.join(format!("{}.yml", resource_name));

        let rendered = render_manifest(
            template,
            &ManifestVars {
                resource_name: &resource_name,
                sweep_id: &ctx.sweep_id,
                volume_index,
                project: &ctx.project,
            },
        );

        let error = match fs::write(&manifest_path, &rendered) {
            Err(e) => Some(format!("failed to write manifest: {}", e)),
            Ok(()) => match kubectl.apply(&manifest_path) {
                Err(e) => Some(e.to_string()),
                Ok(output) if !output.success => Some(output.stderr.trim().to_string()),
                Ok(_) => None,
            },
        };

        match &error {
            None => {
                tracing::info!(resource = %resource_name, pvc = volume_index, "Agent deployed")
            }
            Some(detail) => {
                tracing::warn!(resource = %resource_name, error = %detail, "Agent deploy failed")
            }
        }

        outcomes.push(DeployOutcome {
            resource_name,
            volume_index,
            manifest_path,
            error,
        });
    }

    Ok(outcomes)
}

/// Filter resource names to those carrying the sweep prefix.
///
/// Used by the advisory pre-deploy collision check; matching is on
/// `<prefix>-` anywhere in the name, not just at the start.
pub fn filter_prefixed(names: &[String], prefix: &str) -> Vec<String> {
    let needle = format!("{}-", prefix);
    names
        .iter()
        .filter(|n| n.contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_labels() {
        assert_eq!(DeployMode::Pod.kind(), "pod");
        assert_eq!(DeployMode::Pod.plural(), "pods");
        assert_eq!(DeployMode::Job.kind(), "job");
        assert_eq!(DeployMode::Job.plural(), "jobs");
        assert_eq!(DeployMode::default(), DeployMode::Pod);
    }

    #[test]
    fn test_parse_tokens_defaults() {
        let (mode, agents) = parse_tokens(&[]);
        assert_eq!(mode, DeployMode::Pod);
        assert_eq!(agents, None);
    }

    #[test]
    fn test_parse_tokens_job_flag() {
        let tokens = vec!["--job".to_string()];
        assert_eq!(parse_tokens(&tokens).0, DeployMode::Job);

        let tokens = vec!["--jobs".to_string()];
        assert_eq!(parse_tokens(&tokens).0, DeployMode::Job);
    }

    #[test]
    fn test_parse_tokens_last_integer_wins() {
        let tokens: Vec<String> = ["3", "--job", "junk", "7"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (mode, agents) = parse_tokens(&tokens);
        assert_eq!(mode, DeployMode::Job);
        assert_eq!(agents, Some(7));
    }

    #[test]
    fn test_parse_tokens_clamps_huge_counts() {
        let tokens = vec!["4294967295".to_string()];
        let (_, agents) = parse_tokens(&tokens);
        assert_eq!(agents, Some(MAX_AGENTS));

        let tokens = vec![MAX_AGENTS.to_string()];
        assert_eq!(parse_tokens(&tokens).1, Some(MAX_AGENTS));
    }

    #[test]
    fn test_parse_tokens_ignores_non_numeric() {
        let tokens: Vec<String> = ["foo", "-2", "2.5"].iter().map(|s| s.to_string()).collect();
        let (mode, agents) = parse_tokens(&tokens);
        assert_eq!(mode, DeployMode::Pod);
        assert_eq!(agents, None);
    }

    #[test]
    fn test_volume_indices_skip_reserved_range() {
        // Ordinals 1..=N map to indices 3..=N+2, each used exactly once
        let indices: Vec<u32> = (1..=4).map(volume_index).collect();
        assert_eq!(indices, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_resource_names_for_run() {
        let names: Vec<String> = (1..=3)
            .map(|i| resource_name("foo", volume_index(i)))
            .collect();
        assert_eq!(names, vec!["sweep-foo-3", "sweep-foo-4", "sweep-foo-5"]);
    }

    #[test]
    fn test_render_replaces_all_occurrences() {
        let template = "id: {SWEEP_ID}\nagain: {SWEEP_ID}\npvc: pvc-{PVC_NUM}\n";
        let vars = ManifestVars {
            resource_name: "sweep-foo-3",
            sweep_id: "AB12CD34",
            volume_index: 3,
            project: "proj",
        };
        let rendered = render_manifest(template, &vars);
        assert_eq!(rendered, "id: AB12CD34\nagain: AB12CD34\npvc: pvc-3\n");
    }

    #[test]
    fn test_render_absent_placeholder_is_not_an_error() {
        let template = "name: {RESOURCE_NAME}\n";
        let vars = ManifestVars {
            resource_name: "sweep-foo-3",
            sweep_id: "AB12CD34",
            volume_index: 3,
            project: "proj",
        };
        assert_eq!(render_manifest(template, &vars), "name: sweep-foo-3\n");
    }

    #[test]
    fn test_render_full_template() {
        let template = "\
apiVersion: v1
kind: Pod
metadata:
  name: {RESOURCE_NAME}
spec:
  containers:
    - name: agent
      args: [\"agent\", \"acct/{WANDB_PROJECT}/{SWEEP_ID}\"]
      volumeMounts:
        - name: data
          mountPath: /data
  volumes:
    - name: data
      persistentVolumeClaim:
        claimName: pvc-{PVC_NUM}
";
        let vars = ManifestVars {
            resource_name: "sweep-bert-5",
            sweep_id: "ZZ11YY22",
            volume_index: 5,
            project: "nlp",
        };
        let rendered = render_manifest(template, &vars);
        assert!(rendered.contains("name: sweep-bert-5"));
        assert!(rendered.contains("acct/nlp/ZZ11YY22"));
        assert!(rendered.contains("claimName: pvc-5"));
        assert!(!rendered.contains('{'));
    }

    #[test]
    fn test_filter_prefixed() {
        let names: Vec<String> = [
            "sweep-foo-3",
            "sweep-foobar-3",
            "sweep-foo-12",
            "unrelated",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let matched = filter_prefixed(&names, "sweep-foo");
        assert_eq!(matched, vec!["sweep-foo-3", "sweep-foo-12"]);
    }

    #[test]
    fn test_run_context_prefix() {
        let ctx = RunContext {
            entity: "acct".to_string(),
            project: "proj".to_string(),
            sweep_name: "foo".to_string(),
            sweep_id: "AB12CD34".to_string(),
            mode: DeployMode::Pod,
            agents: 4,
        };
        assert_eq!(ctx.resource_prefix(), "sweep-foo");
    }
}
