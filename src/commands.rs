//! Pipeline orchestration
//!
//! The whole run is one linear pipeline: extract the sweep definition,
//! create the remote sweep, warn on prefix collisions, fan out the agents,
//! then hand over to the monitor. Each stage either terminates the process
//! (fatal preconditions) or reports and moves on.

use crate::cluster::Kubectl;
use crate::config::SweepCtlConfig;
use crate::deploy::{self, DeployMode, RunContext};
use crate::style;
use crate::sweep::SweepDefinition;
use crate::{Result, SweepCtlError};
use std::fs;
use std::path::Path;
use std::time::Duration;
use wandb::Wandb;

/// Run the full create-and-deploy pipeline
pub fn deploy(config: &SweepCtlConfig, mode: DeployMode, agents: u32) -> Result<()> {
    // Preconditions: both input documents must exist before anything runs
    let template_path = mode.template_path(config);
    if !template_path.exists() {
        return Err(SweepCtlError::FileMissing(template_path.to_path_buf()));
    }

    let def = SweepDefinition::load(&config.sweep_file)?;
    println!(
        "{} Sweep definition: project={} name={}",
        style::ok(),
        def.project,
        def.name
    );

    // Both tools must be present before any remote work starts
    let wandb = Wandb::new(&config.entity)
        .map_err(|_| SweepCtlError::ToolMissing("wandb".to_string()))?;
    let kubectl = Kubectl::new(&config.namespace)?;

    // Stage 2: create the remote sweep and recover its id
    let handle = wandb.create_sweep(&def.path, &def.project)?;
    println!(
        "{} Created sweep {}",
        style::ok(),
        style::sweep_id(&handle.sweep_id)
    );
    tracing::info!(sweep_id = %handle.sweep_id, project = %def.project, "Sweep created");

    let ctx = RunContext {
        entity: config.entity.clone(),
        project: def.project.clone(),
        sweep_name: def.name.clone(),
        sweep_id: handle.sweep_id.clone(),
        mode,
        agents,
    };

    // Stage 3: advisory collision check, never blocks
    check_existing(&kubectl, &ctx);

    // Stage 4: fan out the agents
    let template = fs::read_to_string(template_path)?;
    let outcomes = deploy::deploy_agents(&kubectl, &ctx, &template, Path::new("."))?;

    for outcome in &outcomes {
        match &outcome.error {
            None => println!(
                "{} {} (pvc {})",
                style::ok(),
                style::resource(&outcome.resource_name),
                outcome.volume_index
            ),
            Some(detail) => println!(
                "{} {} failed: {}",
                style::fail(),
                style::resource(&outcome.resource_name),
                detail
            ),
        }
    }

    let deployed = outcomes.iter().filter(|o| o.is_success()).count();
    println!(
        "Deployed {} agents as {}s",
        style::deployed_count(deployed, ctx.agents as usize),
        ctx.mode
    );

    // Stage 5: report and tail the last loop iteration's resource
    let last = outcomes.last().map(|o| o.resource_name.clone());
    crate::monitor::report(
        &kubectl,
        &ctx,
        last.as_deref(),
        Duration::from_secs(config.log_wait_secs),
    )
}

/// Warn about cluster resources already carrying this sweep's prefix.
///
/// Advisory only: lookup failures and matches are both reported and ignored.
fn check_existing(kubectl: &Kubectl, ctx: &RunContext) {
    let prefix = ctx.resource_prefix();
    match kubectl.resource_names(ctx.mode.kind()) {
        Ok(names) => {
            let existing = deploy::filter_prefixed(&names, &prefix);
            if !existing.is_empty() {
                println!(
                    "{} Found existing {}s with prefix '{}-':",
                    style::warn(),
                    ctx.mode,
                    prefix
                );
                for name in &existing {
                    println!("    {}", style::resource(name));
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not check for existing resources");
        }
    }
}
