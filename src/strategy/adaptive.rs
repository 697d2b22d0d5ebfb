use super::energy_aware::EnergyAwareStrategy;
use super::frequency_lock::FrequencyLockStrategy;
use super::phase_nudge::PhaseNudgeStrategy;
use super::pulse::PulseStrategy;
use super::Strategy;
use crate::core::state::{Action, Context, State};
use std::sync::Arc;
use std::time::Duration;

/// Selects among a pool of child strategies by the current `Context`
/// rather than implementing its own propose logic (spec §4.5). Low
/// stability favors conserving energy, high local coherence favors
/// locking frequency, otherwise it nudges phase directly.
pub struct AdaptiveStrategy {
    children: Vec<(&'static str, Arc<dyn Strategy>)>,
}

impl AdaptiveStrategy {
    pub fn new(children: Vec<(&'static str, Arc<dyn Strategy>)>) -> Self {
        AdaptiveStrategy { children }
    }

    pub fn with_defaults() -> Self {
        AdaptiveStrategy::new(vec![
            ("phase_nudge", Arc::new(PhaseNudgeStrategy::new(0.7))),
            ("frequency_lock", Arc::new(FrequencyLockStrategy::new(0.5))),
            ("energy_aware", Arc::new(EnergyAwareStrategy::new(0.1))),
            (
                "pulse",
                Arc::new(PulseStrategy::new(Duration::from_secs(2), 0.6)),
            ),
        ])
    }

    fn select(&self, ctx: &Context) -> &Arc<dyn Strategy> {
        let wanted = if ctx.stability < 0.3 {
            "energy_aware"
        } else if ctx.local_coherence > 0.8 {
            "frequency_lock"
        } else {
            "phase_nudge"
        };

        self.children
            .iter()
            .find(|(tag, _)| *tag == wanted)
            .map(|(_, strategy)| strategy)
            .unwrap_or_else(|| {
                &self
                    .children
                    .first()
                    .expect("AdaptiveStrategy requires at least one child")
                    .1
            })
    }
}

impl Strategy for AdaptiveStrategy {
    fn propose(&self, current: &State, target: &State, ctx: &Context) -> (Action, f64) {
        self.select(ctx).propose(current, target, ctx)
    }
}
