//! Decision maker — picks one `Action` from a candidate list by
//! benefit/cost ratio.

use super::state::{Action, ActionKind, State};
use crate::error::CoreError;
use std::sync::Arc;

pub trait DecisionMaker: Send + Sync {
    /// Choose an action from `options` given the agent's `current` state.
    /// Returns the chosen action and a confidence in `[0,1]`.
    fn decide(&self, current: &State, options: &[Action]) -> (Action, f64);
}

/// Benefit/cost ratio decision maker (spec §4.3). Registered under the
/// `simple` tag; `adaptive` is accepted as an alias since this is the
/// only decision-maker variant the spec defines.
pub struct SimpleDecisionMaker;

impl DecisionMaker for SimpleDecisionMaker {
    fn decide(&self, current: &State, options: &[Action]) -> (Action, f64) {
        if options.is_empty() {
            return (Action::maintain(0.0, current.coherence), current.coherence);
        }

        let mut best_idx = None;
        let mut best_score = f64::NEG_INFINITY;

        for (i, opt) in options.iter().enumerate() {
            if opt.benefit.is_nan() {
                continue;
            }
            let cost_floor = opt.cost.max(0.1);
            let score = opt.benefit / cost_floor;
            if score > best_score {
                best_score = score;
                best_idx = Some(i);
            }
        }

        match best_idx {
            Some(i) => {
                let confidence = (best_score / 2.0).clamp(0.0, 1.0);
                (options[i].clone(), confidence)
            }
            // every option had a NaN benefit
            None => (Action::maintain(0.0, current.coherence), current.coherence),
        }
    }
}

/// Build a decision maker from the `simple` tag (`adaptive` accepted as
/// an alias, since this is the only variant the spec defines).
pub fn build_decision_maker(tag: &str) -> Result<Arc<dyn DecisionMaker>, CoreError> {
    match tag {
        "simple" | "adaptive" => Ok(Arc::new(SimpleDecisionMaker)),
        other => Err(CoreError::InvalidConfig(format!(
            "unknown decision maker tag: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn state() -> State {
        State::new(0.0, Duration::from_millis(100), 0.4)
    }

    fn action(kind: ActionKind, cost: f64, benefit: f64) -> Action {
        Action {
            kind,
            value: 0.0,
            cost,
            benefit,
        }
    }

    #[test]
    fn empty_options_return_maintain() {
        let dm = SimpleDecisionMaker;
        let (chosen, confidence) = dm.decide(&state(), &[]);
        assert_eq!(chosen.kind, ActionKind::Maintain);
        assert_eq!(confidence, state().coherence);
    }

    #[test]
    fn picks_highest_benefit_cost_ratio() {
        let dm = SimpleDecisionMaker;
        let low = action(ActionKind::PhaseNudge, 2.0, 1.0); // score 0.5
        let high = action(ActionKind::Pulse, 1.0, 3.0); // score 3.0
        let (chosen, confidence) = dm.decide(&state(), &[low, high.clone()]);
        assert_eq!(chosen.kind, high.kind);
        assert!((confidence - 1.0).abs() < 1e-9); // clamped from 1.5
    }

    #[test]
    fn cost_floor_is_point_one() {
        let dm = SimpleDecisionMaker;
        let zero_cost = action(ActionKind::PhaseNudge, 0.0, 0.2); // score 2.0 (0.2/0.1)
        let (_chosen, confidence) = dm.decide(&state(), &[zero_cost]);
        assert!((confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ties_break_to_first_occurrence() {
        let dm = SimpleDecisionMaker;
        let a = action(ActionKind::PhaseNudge, 1.0, 1.0);
        let b = action(ActionKind::Pulse, 1.0, 1.0);
        let (chosen, _) = dm.decide(&state(), &[a.clone(), b]);
        assert_eq!(chosen.kind, a.kind);
    }

    #[test]
    fn nan_benefit_options_are_skipped() {
        let dm = SimpleDecisionMaker;
        let nan = action(ActionKind::Pulse, 1.0, f64::NAN);
        let real = action(ActionKind::PhaseNudge, 1.0, 0.5);
        let (chosen, _) = dm.decide(&state(), &[nan, real.clone()]);
        assert_eq!(chosen.kind, real.kind);
    }

    #[test]
    fn unknown_tag_is_invalid_config() {
        let err = build_decision_maker("not-a-tag").unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn recognized_tags_build() {
        assert!(build_decision_maker("simple").is_ok());
        assert!(build_decision_maker("adaptive").is_ok());
    }

    #[test]
    fn determinism() {
        let dm = SimpleDecisionMaker;
        let opts = vec![
            action(ActionKind::PhaseNudge, 2.0, 1.0),
            action(ActionKind::Pulse, 1.0, 3.0),
        ];
        let first = dm.decide(&state(), &opts);
        let second = dm.decide(&state(), &opts);
        assert_eq!(first, second);
    }
}
