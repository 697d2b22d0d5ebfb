use super::{clamp_rate, Strategy};
use crate::core::phase::phase_difference;
use crate::core::state::{Action, ActionKind, Context, State};

/// Drives the phase toward the target at a rate scaled by `sync`, favoring
/// frequency agreement over raw phase speed.
pub struct FrequencyLockStrategy {
    sync: f64,
}

impl FrequencyLockStrategy {
    pub fn new(sync: f64) -> Self {
        FrequencyLockStrategy {
            sync: clamp_rate(sync),
        }
    }
}

impl Strategy for FrequencyLockStrategy {
    fn propose(&self, current: &State, target: &State, ctx: &Context) -> (Action, f64) {
        let diff = phase_difference(target.phase, current.phase);
        let value = diff * self.sync;
        let action = Action {
            kind: ActionKind::FrequencyLock,
            value,
            cost: value.abs() * 3.0,
            benefit: ctx.local_coherence * 2.0,
        };
        let confidence = ctx.local_coherence * self.sync;
        (action, confidence)
    }
}
