//! Pluggable phase-adjustment strategies (spec §4.5).
//!
//! Dispatch is tag-based rather than a class hierarchy, the way the
//! teacher resolves `SwarmConfig`/`EvolutionConfig` string tags rather
//! than trait-object factories strewn through call sites. Unknown tags
//! fail construction with `CoreError::InvalidConfig`, per spec §6.

mod adaptive;
mod energy_aware;
mod frequency_lock;
mod phase_nudge;
mod pulse;

pub use adaptive::AdaptiveStrategy;
pub use energy_aware::EnergyAwareStrategy;
pub use frequency_lock::FrequencyLockStrategy;
pub use phase_nudge::PhaseNudgeStrategy;
pub use pulse::PulseStrategy;

use crate::core::state::{Action, Context, State};
use crate::error::CoreError;
use std::sync::Arc;

pub trait Strategy: Send + Sync {
    /// Propose an `Action` moving `current` toward `target` given `ctx`.
    /// Returns the action and a confidence in `[0,1]`.
    fn propose(&self, current: &State, target: &State, ctx: &Context) -> (Action, f64);
}

/// Clamp a rate-like parameter to `[0,1]`. Non-finite values coerce to 0,
/// except `+inf` which coerces to 1 (spec §4.5).
pub(crate) fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else if rate == f64::INFINITY {
        1.0
    } else if rate == f64::NEG_INFINITY {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

/// Build a strategy from one of the recognized tags: `phase_nudge`,
/// `frequency_lock`, `energy_aware`, `pulse`, `adaptive`.
pub fn build_strategy(tag: &str) -> Result<Arc<dyn Strategy>, CoreError> {
    match tag {
        "phase_nudge" => Ok(Arc::new(PhaseNudgeStrategy::new(0.7))),
        "frequency_lock" => Ok(Arc::new(FrequencyLockStrategy::new(0.5))),
        "energy_aware" => Ok(Arc::new(EnergyAwareStrategy::new(0.1))),
        "pulse" => Ok(Arc::new(PulseStrategy::new(
            std::time::Duration::from_secs(2),
            0.6,
        ))),
        "adaptive" => Ok(Arc::new(AdaptiveStrategy::with_defaults())),
        other => Err(CoreError::InvalidConfig(format!(
            "unknown strategy tag: {other}"
        ))),
    }
}
