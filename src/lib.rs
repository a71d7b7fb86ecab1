//! sweepctl - W&B Sweep Controller with Kubernetes Agent Fan-out
//!
//! sweepctl creates a Weights & Biases hyperparameter sweep from a definition
//! file and deploys a fixed number of sweep agents onto a Kubernetes cluster,
//! each bound to a sequential persistent-volume slot past a reserved range.
//!
//! # Architecture
//!
//! - **sweep**: Sweep definition loading and field extraction
//! - **config**: Settings file (entity, namespace, template paths)
//! - **cluster**: kubectl wrapper (get/apply/logs)
//! - **deploy**: Manifest rendering and per-agent fan-out
//! - **monitor**: Post-deploy reporting and log tailing
//!
//! Sweep submission and id recovery live in the `wandb` wrapper crate.

// Core modules
pub mod cluster;
pub mod config;
pub mod deploy;
pub mod error;
pub mod sweep;

// Components
pub mod commands;
pub mod logging;
pub mod monitor;
pub mod style;

// Re-exports
pub use error::{Result, SweepCtlError};
