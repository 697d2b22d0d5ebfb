//! phasync-core — a decentralized phase-synchronization engine.
//!
//! A population of oscillators (agents) adjusts individual phases
//! through local-only neighbor interactions so that a global coherence
//! target is met without centralized control. This crate is the
//! concurrent simulation core: agent state machine, neighbor graph,
//! per-agent decision/action loop, pluggable phase-adjustment
//! strategies, energy accounting, and the swarm-level convergence
//! driver. Command-line demos, configuration loading, and persistence
//! are external collaborators, not part of this crate.

pub mod core;
pub mod error;
pub mod random;
pub mod strategy;
pub mod swarm;

pub use core::{Action, ActionKind, Agent, Context, State};
pub use error::{CoreError, CoreResult};
pub use random::{DefaultRandomSource, RandomSource, SeededRandomSource};
pub use swarm::{CancelToken, Monitor, Outcome, RuntimeConfig, Swarm, SwarmOptions, Topology};

use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber reading `RUST_LOG`-style directives,
/// falling back to `level` (or `info`) when unset. Callers own whether
/// and when to call this; the crate never installs one implicitly.
pub fn setup_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("info")));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[pymodule]
fn phasync_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<swarm::Monitor>()?;
    m.add_class::<swarm::SwarmHandle>()?;
    Ok(())
}
