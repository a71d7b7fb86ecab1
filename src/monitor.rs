//! Post-deploy reporting
//!
//! Prints the sweep dashboard URL, lists pods in the namespace, then tails
//! the log stream of the last deployed resource. This is a convenience tail
//! for the operator, not a monitoring subsystem: no retry, no multiplexing
//! across agents.

use crate::cluster::Kubectl;
use crate::deploy::RunContext;
use crate::style;
use crate::Result;
use std::thread;
use std::time::Duration;

/// Report monitoring endpoints and tail the last deployed agent.
///
/// `last_resource` is the resource name of the final deploy-loop iteration,
/// handed over explicitly by the deployer. The pause gives the resource
/// time to initialize before the log stream opens.
///
/// The deploy already happened, so everything here is best-effort: a failed
/// listing or log stream is reported without changing the exit status.
pub fn report(
    kubectl: &Kubectl,
    ctx: &RunContext,
    last_resource: Option<&str>,
    log_wait: Duration,
) -> Result<()> {
    println!();
    println!(
        "Sweep dashboard: {}",
        wandb::sweep_url(&ctx.entity, &ctx.project, &ctx.sweep_id)
    );

    match kubectl.get("pods") {
        Ok(pods) if pods.success => {
            println!();
            println!("Current pods in namespace '{}':", kubectl.namespace());
            print!("{}", pods.stdout);
        }
        Ok(pods) => tracing::warn!(error = %pods.stderr.trim(), "Could not list pods"),
        Err(e) => tracing::warn!(error = %e, "Could not list pods"),
    }

    let Some(resource) = last_resource else {
        println!(
            "{} No agent was deployed; skipping log tail",
            style::warn()
        );
        return Ok(());
    };

    println!();
    println!(
        "Waiting {}s for {} to start, then tailing its logs (Ctrl-C to stop)...",
        log_wait.as_secs(),
        style::resource(resource)
    );
    thread::sleep(log_wait);

    if let Err(e) = kubectl.logs_follow(resource) {
        tracing::warn!(resource = %resource, error = %e, "Log tail failed");
    }
    Ok(())
}
