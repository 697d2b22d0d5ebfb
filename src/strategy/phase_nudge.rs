use super::{clamp_rate, Strategy};
use crate::core::phase::phase_difference;
use crate::core::state::{Action, ActionKind, Context, State};

/// Nudges the phase a fraction `rate` of the way toward the target each tick.
pub struct PhaseNudgeStrategy {
    rate: f64,
}

impl PhaseNudgeStrategy {
    pub fn new(rate: f64) -> Self {
        PhaseNudgeStrategy {
            rate: clamp_rate(rate),
        }
    }
}

impl Strategy for PhaseNudgeStrategy {
    fn propose(&self, current: &State, target: &State, ctx: &Context) -> (Action, f64) {
        let diff = phase_difference(target.phase, current.phase);
        let value = diff * self.rate;
        let action = Action {
            kind: ActionKind::PhaseNudge,
            value,
            cost: value.abs() * 2.0,
            benefit: (1.0 - diff.abs() / std::f64::consts::PI) * 1.5,
        };
        let confidence = (1.0 - ctx.local_coherence).max(0.5);
        (action, confidence)
    }
}
