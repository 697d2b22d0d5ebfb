use super::Strategy;
use crate::core::phase::phase_difference;
use crate::core::state::{Action, ActionKind, Context, State};

/// Holds position when already close to target, otherwise takes a small
/// step and reports progress as the benefit (spec §4.5). `threshold` gates
/// which branch fires.
pub struct EnergyAwareStrategy {
    threshold: f64,
}

impl EnergyAwareStrategy {
    pub fn new(threshold: f64) -> Self {
        EnergyAwareStrategy {
            threshold: threshold.max(0.0),
        }
    }
}

impl Strategy for EnergyAwareStrategy {
    fn propose(&self, current: &State, target: &State, ctx: &Context) -> (Action, f64) {
        let diff = phase_difference(target.phase, current.phase);

        if diff.abs() < self.threshold {
            let action = Action {
                kind: ActionKind::Maintain,
                value: 0.0,
                cost: 0.1,
                benefit: ctx.stability,
            };
            (action, 0.5)
        } else {
            let progress = 1.0 - diff.abs() / std::f64::consts::PI;
            let value = diff * 0.1;
            let action = Action {
                kind: ActionKind::EnergySave,
                value,
                cost: value.abs().max(0.5),
                benefit: progress * 0.5,
            };
            (action, 0.3)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state(phase: f64) -> State {
        State::new(phase, Duration::from_millis(100), 0.5)
    }

    fn ctx(stability: f64) -> Context {
        Context {
            neighbors: 2,
            density: 0.5,
            local_coherence: 0.5,
            stability,
        }
    }

    #[test]
    fn below_threshold_maintains() {
        let strategy = EnergyAwareStrategy::new(0.2);
        let (action, confidence) = strategy.propose(&state(0.0), &state(0.05), &ctx(0.7));
        assert_eq!(action.kind, ActionKind::Maintain);
        assert_eq!(action.value, 0.0);
        assert!((action.benefit - 0.7).abs() < 1e-9);
        assert!((confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn above_threshold_saves_energy() {
        let strategy = EnergyAwareStrategy::new(0.1);
        let (action, confidence) = strategy.propose(&state(0.0), &state(1.0), &ctx(0.7));
        assert_eq!(action.kind, ActionKind::EnergySave);
        assert!((action.value - 0.1).abs() < 1e-9);
        assert!((confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn cost_has_a_floor_of_half() {
        let strategy = EnergyAwareStrategy::new(0.0);
        let (action, _) = strategy.propose(&state(0.0), &state(0.2), &ctx(0.5));
        assert!((action.cost - 0.5).abs() < 1e-9);
    }

    #[test]
    fn negative_threshold_is_coerced_to_zero() {
        let strategy = EnergyAwareStrategy::new(-5.0);
        assert_eq!(strategy.threshold, 0.0);
    }
}
