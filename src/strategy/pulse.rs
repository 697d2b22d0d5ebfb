use super::{clamp_rate, Strategy};
use crate::core::phase::phase_difference;
use crate::core::state::{Action, ActionKind, Context, State};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Fires a large corrective jump once per `period`, otherwise holds.
/// `last_pulse` is per-instance state — each agent must construct its own
/// `PulseStrategy` rather than share one across the swarm (spec §4.5).
pub struct PulseStrategy {
    period: Duration,
    amplitude: f64,
    last_pulse: Mutex<Instant>,
}

impl PulseStrategy {
    pub fn new(period: Duration, amplitude: f64) -> Self {
        PulseStrategy {
            period,
            amplitude: clamp_rate(amplitude),
            last_pulse: Mutex::new(Instant::now() - period),
        }
    }
}

impl Strategy for PulseStrategy {
    fn propose(&self, current: &State, target: &State, ctx: &Context) -> (Action, f64) {
        let diff = phase_difference(target.phase, current.phase);
        let mut last_pulse = self.last_pulse.lock();
        let now = Instant::now();

        if now.duration_since(*last_pulse) >= self.period {
            *last_pulse = now;
            let value = diff * self.amplitude;
            let action = Action {
                kind: ActionKind::Pulse,
                value,
                cost: value.abs() * 4.0,
                benefit: 2.0,
            };
            (action, self.amplitude)
        } else {
            let action = Action {
                kind: ActionKind::Maintain,
                value: 0.0,
                cost: 0.1,
                benefit: ctx.stability * 0.5,
            };
            (action, 0.3)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(phase: f64) -> State {
        State::new(phase, Duration::from_millis(100), 0.5)
    }

    fn ctx() -> Context {
        Context {
            neighbors: 2,
            density: 0.5,
            local_coherence: 0.5,
            stability: 0.8,
        }
    }

    #[test]
    fn fires_immediately_when_period_already_elapsed() {
        let strategy = PulseStrategy::new(Duration::from_millis(10), 0.5);
        let (action, confidence) = strategy.propose(&state(0.0), &state(1.0), &ctx());
        assert_eq!(action.kind, ActionKind::Pulse);
        assert!((action.value - 0.5).abs() < 1e-9);
        assert!((confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn holds_between_pulses() {
        let strategy = PulseStrategy::new(Duration::from_secs(60), 0.5);
        let _first = strategy.propose(&state(0.0), &state(1.0), &ctx());
        let (second, confidence) = strategy.propose(&state(0.0), &state(1.0), &ctx());
        assert_eq!(second.kind, ActionKind::Maintain);
        assert_eq!(second.value, 0.0);
        assert!((confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn amplitude_is_clamped_at_construction() {
        let strategy = PulseStrategy::new(Duration::from_secs(1), 3.0);
        assert_eq!(strategy.amplitude, 1.0);
    }
}
