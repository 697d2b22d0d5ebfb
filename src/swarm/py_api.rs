//! Thin Python surface over `Swarm`: construction, driving the
//! simulation, and reading back composite results as `PyDict`s rather
//! than forcing every value type into `#[pyclass]` shapes.

use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Arc;
use std::time::Duration;

use super::cancel::CancelToken;
use super::topology::Topology;
use super::{RuntimeConfig, Swarm, SwarmOptions};
use crate::core::state::State;
use crate::random::{DefaultRandomSource, SeededRandomSource};

fn parse_topology(tag: &str) -> PyResult<Topology> {
    match tag {
        "fully_connected" => Ok(Topology::FullyConnected),
        "ring" => Ok(Topology::Ring),
        "star" => Ok(Topology::Star),
        "small_world" => Ok(Topology::SmallWorld),
        other => Err(pyo3::exceptions::PyValueError::new_err(format!(
            "unknown topology: {other}"
        ))),
    }
}

#[pyclass]
pub struct SwarmHandle {
    swarm: Swarm,
    cancel: CancelToken,
}

#[pymethods]
impl SwarmHandle {
    #[new]
    #[pyo3(signature = (
        size,
        target_coherence = 0.7,
        target_frequency_ms = 100,
        strategy_tag = None,
        decision_tag = None,
        goal_tag = None,
        resource_tag = None,
        topology = None,
        seed = None,
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        size: usize,
        target_coherence: f64,
        target_frequency_ms: u64,
        strategy_tag: Option<String>,
        decision_tag: Option<String>,
        goal_tag: Option<String>,
        resource_tag: Option<String>,
        topology: Option<String>,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let target = State::new(0.0, Duration::from_millis(target_frequency_ms.max(1)), target_coherence);

        let random: Arc<dyn crate::random::RandomSource> = match seed {
            Some(seed) => Arc::new(SeededRandomSource::new(seed)),
            None => Arc::new(DefaultRandomSource),
        };

        let options = SwarmOptions {
            runtime: RuntimeConfig::default(),
            topology: match topology {
                Some(tag) => parse_topology(&tag)?,
                None => Topology::FullyConnected,
            },
            strategy_tag: strategy_tag.unwrap_or_else(|| "phase_nudge".to_string()),
            decision_tag: decision_tag.unwrap_or_else(|| "simple".to_string()),
            goal_tag: goal_tag.unwrap_or_else(|| "weighted".to_string()),
            resource_tag: resource_tag.unwrap_or_else(|| "token".to_string()),
            random,
            ..SwarmOptions::default()
        };

        let swarm = Swarm::new(size, target, options)?;
        Ok(SwarmHandle {
            swarm,
            cancel: CancelToken::new(),
        })
    }

    /// Runs the simulation to completion (converged, canceled, or
    /// iteration-exhausted) and returns the outcome as a dict.
    pub fn run(&self) -> PyObject {
        let outcome = self.swarm.run(&self.cancel);
        Python::with_gil(|py| {
            let dict = PyDict::new_bound(py);
            let (kind, coherence, ticks) = match outcome {
                super::Outcome::Converged { final_coherence, ticks } => ("converged", final_coherence, ticks),
                super::Outcome::Canceled { final_coherence, ticks } => ("canceled", final_coherence, ticks),
                super::Outcome::IterationExhausted { final_coherence, ticks } => {
                    ("iteration_exhausted", final_coherence, ticks)
                }
            };
            dict.set_item("outcome", kind).unwrap();
            dict.set_item("final_coherence", coherence).unwrap();
            dict.set_item("ticks", ticks).unwrap();
            dict.into()
        })
    }

    /// Requests cancellation; observed at the next tick boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn measure_coherence(&self) -> f64 {
        self.swarm.measure_coherence()
    }

    pub fn disrupt_agents(&self, factor: f64) {
        self.swarm.disrupt_agents(factor);
    }

    pub fn monitor(&self) -> PyObject {
        Python::with_gil(|py| {
            let dict = PyDict::new_bound(py);
            dict.set_item("latest", self.swarm.monitor().latest()).unwrap();
            dict.set_item("average", self.swarm.monitor().average()).unwrap();
            dict.set_item("snapshot", self.swarm.monitor().snapshot()).unwrap();
            dict.into()
        })
    }

    /// Per-agent state snapshot for a single id, or `None` if absent.
    pub fn agent_state(&self, id: &str) -> Option<PyObject> {
        let agent = self.swarm.agent(id)?;
        Some(Python::with_gil(|py| {
            let dict = PyDict::new_bound(py);
            dict.set_item("id", &agent.id).unwrap();
            dict.set_item("phase", agent.phase()).unwrap();
            dict.set_item("energy", agent.energy()).unwrap();
            dict.set_item("local_goal", agent.local_goal()).unwrap();
            dict.set_item("neighbors", agent.neighbor_count()).unwrap();
            dict.into()
        }))
    }

    pub fn agent_count(&self) -> usize {
        self.swarm.agents().len()
    }
}
