//! Goal manager — blends a local and global target `State` by an
//! influence weight.

use super::phase::wrap;
use super::state::State;
use crate::error::CoreError;
use std::sync::Arc;

pub trait GoalManager: Send + Sync {
    fn blend(&self, local: &State, global: &State, weight: f64) -> State;
}

/// Weighted circular blend (spec §4.4). Registered under the `weighted`
/// tag — the only goal-manager variant the spec defines.
pub struct WeightedGoalManager;

impl GoalManager for WeightedGoalManager {
    fn blend(&self, local: &State, global: &State, weight: f64) -> State {
        let w = weight.clamp(0.0, 1.0);

        let x = (1.0 - w) * local.phase.cos() + w * global.phase.cos();
        let y = (1.0 - w) * local.phase.sin() + w * global.phase.sin();
        let phase = wrap(y.atan2(x));

        let coherence = (1.0 - w) * local.coherence + w * global.coherence;

        State {
            phase,
            // Blending is not defined on durations; the local frequency wins.
            frequency: local.frequency,
            coherence,
        }
    }
}

/// Build a goal manager from the `weighted` tag, the only variant the
/// spec defines.
pub fn build_goal_manager(tag: &str) -> Result<Arc<dyn GoalManager>, CoreError> {
    match tag {
        "weighted" => Ok(Arc::new(WeightedGoalManager)),
        other => Err(CoreError::InvalidConfig(format!(
            "unknown goal manager tag: {other}"
        ))),
    }
}
