//! The swarm: owns every agent, wires the topology, and drives the
//! tick loop (spec §4.9).

pub mod cancel;
pub mod monitor;
pub mod py_api;
pub mod topology;

pub use cancel::CancelToken;
pub use monitor::Monitor;
pub use py_api::SwarmHandle;
pub use topology::Topology;

use dashmap::DashMap;
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::agent::{Agent, AgentBuilder, AgentConfig};
use crate::core::resource::build_resource_manager;
use crate::core::phase::order_parameter;
use crate::core::state::State;
use crate::error::{CoreError, CoreResult};
use crate::random::{DefaultRandomSource, RandomSource};

/// Tunables with the defaults named in spec §6.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub tick_period: Duration,
    pub iteration_cap: usize,
    pub small_world_probability: f64,
    pub convergence_consecutive_samples: usize,
    pub stuck_window_fraction: f64,
    pub stuck_improvement_epsilon: f64,
    pub max_workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        RuntimeConfig {
            tick_period: Duration::from_millis(50),
            iteration_cap: 2000,
            small_world_probability: 0.3,
            convergence_consecutive_samples: 5,
            stuck_window_fraction: 1.0 / 3.0,
            stuck_improvement_epsilon: 0.01,
            max_workers: cpus.min(32),
        }
    }
}

/// Construction bundle. `monitor` and `random` are runtime collaborators
/// rather than plain data, so unlike `RuntimeConfig` this struct is not
/// `Deserialize` — an external loader populates `RuntimeConfig` and the
/// tag strings, then fills in the collaborators in code.
pub struct SwarmOptions {
    pub runtime: RuntimeConfig,
    pub topology: Topology,
    pub strategy_tag: String,
    pub decision_tag: String,
    pub goal_tag: String,
    pub resource_tag: String,
    pub resource_capacity: f64,
    pub monitor: Option<Monitor>,
    pub random: Arc<dyn RandomSource>,
    /// Overrides the `AgentBuilder` `Swarm::new` would otherwise construct
    /// from `strategy_tag`/`decision_tag`/`goal_tag`/`resource_tag`, per
    /// spec §6's "agent builder override" construction option.
    pub agent_builder: Option<AgentBuilder>,
}

impl Default for SwarmOptions {
    fn default() -> Self {
        SwarmOptions {
            runtime: RuntimeConfig::default(),
            topology: Topology::FullyConnected,
            strategy_tag: "phase_nudge".to_string(),
            decision_tag: "simple".to_string(),
            goal_tag: "weighted".to_string(),
            resource_tag: "token".to_string(),
            resource_capacity: 1000.0,
            monitor: None,
            random: Arc::new(DefaultRandomSource),
            agent_builder: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Converged { final_coherence: f64, ticks: usize },
    Canceled { final_coherence: f64, ticks: usize },
    IterationExhausted { final_coherence: f64, ticks: usize },
}

impl Outcome {
    pub fn final_coherence(&self) -> f64 {
        match self {
            Outcome::Converged { final_coherence, .. }
            | Outcome::Canceled { final_coherence, .. }
            | Outcome::IterationExhausted { final_coherence, .. } => *final_coherence,
        }
    }

    pub fn ticks(&self) -> usize {
        match self {
            Outcome::Converged { ticks, .. }
            | Outcome::Canceled { ticks, .. }
            | Outcome::IterationExhausted { ticks, .. } => *ticks,
        }
    }
}

pub struct Swarm {
    target: State,
    agents: Vec<Arc<Agent>>,
    index: DashMap<String, Arc<Agent>>,
    monitor: Monitor,
    runtime: RuntimeConfig,
    random: Arc<dyn RandomSource>,
    pool: ThreadPool,
}

impl Swarm {
    pub fn new(size: usize, target: State, options: SwarmOptions) -> CoreResult<Self> {
        if size == 0 {
            return Err(CoreError::InvalidConfig("swarm size must be >= 1".to_string()));
        }
        if target.frequency.is_zero() {
            return Err(CoreError::InvalidConfig(
                "target frequency must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&target.coherence) {
            return Err(CoreError::InvalidConfig(
                "target coherence must be in [0,1]".to_string(),
            ));
        }

        let builder = match options.agent_builder {
            Some(builder) => builder,
            None => {
                let resource_manager =
                    build_resource_manager(&options.resource_tag, options.resource_capacity)?;
                AgentBuilder::new(
                    options.decision_tag.clone(),
                    options.goal_tag.clone(),
                    resource_manager,
                    options.strategy_tag.clone(),
                )
            }
        };

        let max_neighbors_hint = if size > 100 { 20 } else { size.saturating_sub(1) };

        let mut agents = Vec::with_capacity(size);
        for i in 0..size {
            let id = format!("agent-{i}");
            let phase = options.random.phase();
            let jitter = 0.5 + options.random.uniform();
            let frequency = Duration::from_secs_f64((target.frequency.as_secs_f64() * jitter).max(1e-6));
            let config = AgentConfig {
                swarm_size: size,
                assumed_max_neighbors: max_neighbors_hint,
            };
            let agent = builder.build(id, config, phase, frequency)?;
            agents.push(Arc::new(agent));
        }

        options
            .topology
            .build(&agents, options.runtime.small_world_probability, options.random.as_ref())?;

        let index = DashMap::with_capacity(size);
        for agent in &agents {
            index.insert(agent.id.clone(), agent.clone());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.runtime.max_workers.max(1))
            .build()
            .map_err(|e| CoreError::InvalidConfig(format!("failed to build worker pool: {e}")))?;

        info!(size, topology = ?options.topology, "swarm constructed");

        Ok(Swarm {
            target,
            agents,
            index,
            monitor: options.monitor.unwrap_or_default(),
            runtime: options.runtime,
            random: options.random,
            pool,
        })
    }

    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }

    pub fn agent(&self, id: &str) -> Option<Arc<Agent>> {
        self.index.get(id).map(|entry| entry.value().clone())
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn measure_coherence(&self) -> f64 {
        let phases: Vec<f64> = self.agents.iter().map(|a| a.phase()).collect();
        order_parameter(&phases)
    }

    pub fn disrupt_agents(&self, factor: f64) {
        let factor = factor.clamp(0.0, 1.0);
        for agent in &self.agents {
            if self.random.bernoulli(factor) {
                agent.set_phase(self.random.phase());
            }
        }
    }

    fn tick_once(&self) {
        let target = self.target;
        let random = self.random.as_ref();
        self.pool.install(|| {
            self.agents.par_iter().for_each(|agent| {
                let outcome = catch_unwind(AssertUnwindSafe(|| agent.tick(&target, random)));
                if outcome.is_err() {
                    warn!(agent = %agent.id, "agent panicked during tick, treated as no-op");
                }
            });
        });
    }

    /// Drives the simulation until convergence, cancellation, or the
    /// iteration cap (spec §4.9 `Run`).
    pub fn run(&self, cancel: &CancelToken) -> Outcome {
        let mut ticks = 0usize;
        let mut consecutive = 0usize;
        let mut coherence = self.measure_coherence();
        let window_len = ((self.runtime.iteration_cap as f64 * self.runtime.stuck_window_fraction) as usize).max(1);

        loop {
            if cancel.is_canceled() {
                info!(ticks, coherence, "run canceled");
                return Outcome::Canceled {
                    final_coherence: coherence,
                    ticks,
                };
            }
            if ticks >= self.runtime.iteration_cap {
                info!(ticks, coherence, "run exhausted iteration cap");
                return Outcome::IterationExhausted {
                    final_coherence: coherence,
                    ticks,
                };
            }

            self.tick_once();
            ticks += 1;
            coherence = self.measure_coherence();
            self.monitor.record_sample(coherence);
            debug!(ticks, coherence, "tick complete");

            if coherence >= self.target.coherence {
                consecutive += 1;
            } else {
                consecutive = 0;
            }
            if consecutive >= self.runtime.convergence_consecutive_samples {
                info!(ticks, coherence, "run converged");
                return Outcome::Converged {
                    final_coherence: coherence,
                    ticks,
                };
            }

            let snapshot = self.monitor.snapshot();
            if snapshot.len() > window_len {
                let past = snapshot[snapshot.len() - 1 - window_len];
                if (coherence - past).abs() < self.runtime.stuck_improvement_epsilon {
                    debug!(ticks, coherence, "coherence stuck within rolling window");
                }
            }

            std::thread::sleep(self.runtime.tick_period);
        }
    }
}
