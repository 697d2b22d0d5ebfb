//! The agent: oscillator state, behavior, neighbor set, and the
//! per-tick decision loop (spec §4.7).
//!
//! Grouped-state discipline: `AgentStateRecord` (Phase/Energy/LocalGoal/
//! Frequency) and `AgentBehavior` (Influence/Stubbornness) each live
//! behind their own `parking_lot::RwLock`. A writer always swaps the
//! whole record, so a reader never observes a torn combination of
//! fields.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::decision::DecisionMaker;
use super::goal::GoalManager;
use super::neighbor::NeighborSet;
use super::phase::wrap;
use super::resource::ResourceManager;
use super::state::{Action, ActionKind, Context, State};
use crate::error::{CoreError, CoreResult};
use crate::random::RandomSource;
use crate::strategy::Strategy;

pub const MAX_ENERGY: f64 = 100.0;
const DEFAULT_STUBBORNNESS: f64 = 0.2;
const DEFAULT_INFLUENCE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
struct AgentStateRecord {
    phase: f64,
    energy: f64,
    local_goal: f64,
    frequency: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct AgentBehaviorRecord {
    influence: f64,
    stubbornness: f64,
}

/// Immutable per-agent configuration fixed at construction.
#[derive(Clone, Copy, Debug)]
pub struct AgentConfig {
    pub swarm_size: usize,
    /// 0 means "derive from swarm_size" (`swarm_size - 1`).
    pub assumed_max_neighbors: usize,
}

impl AgentConfig {
    fn effective_max(&self) -> usize {
        if self.assumed_max_neighbors > 0 {
            self.assumed_max_neighbors
        } else {
            self.swarm_size.saturating_sub(1)
        }
    }
}

pub struct Agent {
    pub id: String,
    config: AgentConfig,
    state: RwLock<AgentStateRecord>,
    behavior: RwLock<AgentBehaviorRecord>,
    context: RwLock<Context>,
    neighbors: NeighborSet,
    decision_maker: Arc<dyn DecisionMaker>,
    goal_manager: Arc<dyn GoalManager>,
    resource_manager: Arc<dyn ResourceManager>,
    strategy: Arc<dyn Strategy>,
}

impl Agent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        config: AgentConfig,
        initial_phase: f64,
        initial_frequency: Duration,
        decision_maker: Arc<dyn DecisionMaker>,
        goal_manager: Arc<dyn GoalManager>,
        resource_manager: Arc<dyn ResourceManager>,
        strategy: Arc<dyn Strategy>,
    ) -> Self {
        let phase = wrap(initial_phase);
        Agent {
            id: id.into(),
            config,
            state: RwLock::new(AgentStateRecord {
                phase,
                energy: MAX_ENERGY,
                local_goal: phase,
                frequency: initial_frequency,
            }),
            behavior: RwLock::new(AgentBehaviorRecord {
                influence: DEFAULT_INFLUENCE,
                stubbornness: DEFAULT_STUBBORNNESS,
            }),
            context: RwLock::new(Context::empty()),
            neighbors: NeighborSet::new(),
            decision_maker,
            goal_manager,
            resource_manager,
            strategy,
        }
    }

    pub fn phase(&self) -> f64 {
        self.state.read().phase
    }

    pub fn energy(&self) -> f64 {
        self.state.read().energy
    }

    pub fn local_goal(&self) -> f64 {
        self.state.read().local_goal
    }

    /// Overwrites phase directly, outside the `Action`/energy pipeline.
    /// Used for swarm-level disruption and test setup (spec §4.9
    /// `DisruptAgents`) — the grouped-state record is still swapped as a
    /// whole, just with only the phase field changed.
    pub fn set_phase(&self, phase: f64) {
        self.state.write().phase = wrap(phase);
    }

    pub fn frequency(&self) -> Duration {
        self.state.read().frequency
    }

    pub fn context(&self) -> Context {
        *self.context.read()
    }

    pub fn influence(&self) -> f64 {
        self.behavior.read().influence
    }

    pub fn stubbornness(&self) -> f64 {
        self.behavior.read().stubbornness
    }

    /// Clamps to `[0,1]`, per spec §3 "all setters clamp" (property 8).
    pub fn set_influence(&self, value: f64) {
        self.behavior.write().influence = value.clamp(0.0, 1.0);
    }

    pub fn set_stubbornness(&self, value: f64) {
        self.behavior.write().stubbornness = value.clamp(0.0, 1.0);
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn add_neighbor(&self, id: String, peer: std::sync::Weak<Agent>) {
        self.neighbors.insert(&self.id, id, peer);
    }

    pub fn remove_neighbor(&self, id: &str) -> bool {
        self.neighbors.remove(id)
    }

    pub fn has_neighbor(&self, id: &str) -> bool {
        self.neighbors.contains(id)
    }

    /// Reference to this agent's private goal manager, exposed so the
    /// weighted-blend variant (spec §4.4, unused on the per-tick path by
    /// design — see the "Open Questions" in SPEC_FULL.md) stays reachable
    /// and testable in isolation.
    pub fn goal_manager(&self) -> &Arc<dyn GoalManager> {
        &self.goal_manager
    }

    /// Recomputes `Context` and `LocalGoal` from the current neighbor
    /// phases (spec §4.7 `UpdateContext`).
    pub fn update_context(&self) {
        let snapshot = self.neighbors.snapshot();
        if snapshot.is_empty() {
            *self.context.write() = Context::empty();
            return;
        }

        let phi = self.phase();
        let mut sum_cos = 0.0_f64;
        let mut sum_sin = 0.0_f64;
        let mut n = 0usize;

        for handle in &snapshot {
            if let Some(peer) = handle.upgrade() {
                let delta = peer.phase() - phi;
                sum_cos += delta.cos();
                sum_sin += delta.sin();
                n += 1;
            }
        }

        if n == 0 {
            // every neighbor handle was stale (peer dropped)
            *self.context.write() = Context::empty();
            return;
        }

        let n_f = n as f64;
        let local_coherence = (sum_cos * sum_cos + sum_sin * sum_sin).sqrt() / n_f;
        let shift = (sum_sin / n_f).atan2(sum_cos / n_f);
        let coupling = 0.5 + 0.5 * local_coherence;
        let new_local_goal = wrap(phi + shift * coupling);

        let effective_max = self.config.effective_max();
        let density = if effective_max == 0 {
            0.0
        } else {
            n_f / effective_max as f64
        };

        {
            let mut state = self.state.write();
            state.local_goal = new_local_goal;
        }

        *self.context.write() = Context {
            neighbors: n,
            density,
            local_coherence,
            stability: 0.5,
        };
    }

    /// Proposes and probabilistically accepts a candidate action
    /// (spec §4.7 `ProposeAdjustment`). `global_goal` carries the
    /// swarm-wide target; this agent's own `LocalGoal` is used as the
    /// strategy's target phase (the pure-Kuramoto variant — see
    /// SPEC_FULL.md's "Open Questions — resolved").
    pub fn propose_adjustment(
        &self,
        global_goal: &State,
        random: &dyn RandomSource,
    ) -> (Action, bool) {
        let rejected = Action::maintain(0.0, 0.0);

        let stubbornness = self.stubbornness();
        if random.bernoulli(stubbornness) {
            return (rejected, false);
        }

        let ctx = self.context();
        let target = State::new(self.local_goal(), global_goal.frequency, global_goal.coherence);
        let current = State::new(self.phase(), self.frequency(), ctx.local_coherence);

        let (proposal, confidence) = self.strategy.propose(&current, &target, &ctx);

        let maintain_option = Action {
            kind: ActionKind::Maintain,
            value: 0.0,
            cost: 0.1,
            benefit: ctx.stability,
        };
        let options = [proposal, maintain_option];
        let (chosen, acceptance) = self.decision_maker.decide(&current, &options);

        if chosen.cost > self.energy() {
            return (rejected, false);
        }

        if random.bernoulli(confidence * acceptance) {
            (chosen, true)
        } else {
            (rejected, false)
        }
    }

    /// Applies a chosen action (spec §4.7 `ApplyAction`). Returns the
    /// cost actually debited on success.
    pub fn apply_action(&self, action: &Action) -> CoreResult<f64> {
        let mut state = self.state.write();

        if action.cost > state.energy {
            return Err(CoreError::InsufficientEnergy {
                required: action.cost,
                available: state.energy,
            });
        }

        match &action.kind {
            ActionKind::Maintain => {
                state.energy = (state.energy - action.cost).max(0.0);
            }
            ActionKind::Unknown(tag) => {
                return Err(CoreError::UnknownActionType(tag.clone()));
            }
            kind if kind.moves_phase() => {
                state.phase = wrap(state.phase + action.value);
                state.energy = (state.energy - action.cost).max(0.0);
            }
            _ => unreachable!("ActionKind variants are exhaustively Maintain, Unknown, or moves_phase"),
        }

        let cost_applied = action.cost;
        drop(state);

        // Advisory bookkeeping only; the manager's own accounting does
        // not have to reconcile exactly with agent energy (spec §4.7).
        self.resource_manager.request(cost_applied);

        Ok(cost_applied)
    }

    /// Runs one full tick: update context, propose, and apply if
    /// accepted. Recoverable errors are logged and downgraded to a
    /// no-op, matching the driver's per-agent degradation handling
    /// (spec §7).
    pub fn tick(&self, global_goal: &State, random: &dyn RandomSource) {
        self.update_context();
        let (action, accepted) = self.propose_adjustment(global_goal, random);
        if !accepted {
            return;
        }
        if let Err(err) = self.apply_action(&action) {
            warn!(agent = %self.id, error = %err, "tick degraded to no-op");
        }
    }
}

pub struct AgentBuilder {
    decision_tag: String,
    goal_tag: String,
    resource_manager: Arc<dyn ResourceManager>,
    strategy_tag: String,
}

impl AgentBuilder {
    pub fn new(
        decision_tag: impl Into<String>,
        goal_tag: impl Into<String>,
        resource_manager: Arc<dyn ResourceManager>,
        strategy_tag: impl Into<String>,
    ) -> Self {
        AgentBuilder {
            decision_tag: decision_tag.into(),
            goal_tag: goal_tag.into(),
            resource_manager,
            strategy_tag: strategy_tag.into(),
        }
    }

    /// Builds one agent. Strategies are constructed fresh per call —
    /// never shared — so `Pulse`'s `last_pulse` state is inherently
    /// scoped to a single agent (spec §9 "Pulse state").
    pub fn build(
        &self,
        id: impl Into<String>,
        config: AgentConfig,
        initial_phase: f64,
        initial_frequency: Duration,
    ) -> CoreResult<Agent> {
        let decision_maker = super::decision::build_decision_maker(&self.decision_tag)?;
        let goal_manager = super::goal::build_goal_manager(&self.goal_tag)?;
        let strategy = crate::strategy::build_strategy(&self.strategy_tag)?;

        Ok(Agent::new(
            id,
            config,
            initial_phase,
            initial_frequency,
            decision_maker,
            goal_manager,
            self.resource_manager.clone(),
            strategy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decision::SimpleDecisionMaker;
    use crate::core::goal::WeightedGoalManager;
    use crate::core::resource::TokenBucket;
    use crate::random::DefaultRandomSource;
    use crate::strategy::PhaseNudgeStrategy;
    use std::sync::Weak;

    fn config() -> AgentConfig {
        AgentConfig {
            swarm_size: 5,
            assumed_max_neighbors: 0,
        }
    }

    fn build_agent(id: &str, phase: f64) -> Arc<Agent> {
        Arc::new(Agent::new(
            id,
            config(),
            phase,
            Duration::from_millis(50),
            Arc::new(SimpleDecisionMaker),
            Arc::new(WeightedGoalManager),
            Arc::new(TokenBucket::new(1000.0)),
            Arc::new(PhaseNudgeStrategy::new(0.7)),
        ))
    }

    #[test]
    fn new_agent_starts_at_full_energy_and_wrapped_phase() {
        let agent = build_agent("a", 10.0);
        assert_eq!(agent.energy(), MAX_ENERGY);
        assert!((0.0..std::f64::consts::TAU).contains(&agent.phase()));
    }

    #[test]
    fn behavior_setters_clamp() {
        let agent = build_agent("a", 0.0);
        agent.set_influence(5.0);
        assert_eq!(agent.influence(), 1.0);
        agent.set_stubbornness(-3.0);
        assert_eq!(agent.stubbornness(), 0.0);
    }

    #[test]
    fn update_context_with_no_neighbors_is_empty() {
        let agent = build_agent("a", 0.0);
        agent.update_context();
        let ctx = agent.context();
        assert_eq!(ctx.neighbors, 0);
        assert_eq!(ctx.local_coherence, 0.0);
        assert_eq!(ctx.stability, 0.5);
    }

    #[test]
    fn update_context_pulls_local_goal_toward_aligned_neighbors() {
        let a = build_agent("a", 0.0);
        let b = build_agent("b", 1.0);
        a.add_neighbor("b".to_string(), Arc::downgrade(&b));
        a.update_context();
        let ctx = a.context();
        assert_eq!(ctx.neighbors, 1);
        assert!(ctx.local_coherence > 0.99);
        // a single neighbor at phase 1.0 pulls local_goal from 0 toward 1.
        assert!(a.local_goal() > 0.0 && a.local_goal() <= 1.0 + 1e-9);
    }

    #[test]
    fn update_context_skips_dropped_neighbors() {
        let a = build_agent("a", 0.0);
        {
            let b = build_agent("b", 1.0);
            a.add_neighbor("b".to_string(), Arc::downgrade(&b));
        } // b dropped here
        a.update_context();
        let ctx = a.context();
        assert_eq!(ctx.neighbors, 0);
    }

    #[test]
    fn apply_action_insufficient_energy_leaves_state_untouched() {
        let agent = build_agent("a", 0.5);
        let action = Action {
            kind: ActionKind::AdjustPhase,
            value: 1.0,
            cost: 500.0,
            benefit: 0.0,
        };
        let before_phase = agent.phase();
        let err = agent.apply_action(&action).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientEnergy { .. }));
        assert_eq!(agent.phase(), before_phase);
        assert_eq!(agent.energy(), MAX_ENERGY);
    }

    #[test]
    fn apply_action_unknown_type_leaves_state_untouched() {
        let agent = build_agent("a", 0.5);
        let action = Action {
            kind: ActionKind::Unknown("bogus".to_string()),
            value: 0.0,
            cost: 1.0,
            benefit: 0.0,
        };
        let before_phase = agent.phase();
        let before_energy = agent.energy();
        let err = agent.apply_action(&action).unwrap_err();
        assert!(matches!(err, CoreError::UnknownActionType(tag) if tag == "bogus"));
        assert_eq!(agent.phase(), before_phase);
        assert_eq!(agent.energy(), before_energy);
    }

    #[test]
    fn apply_action_moves_phase_and_debits_energy() {
        let agent = build_agent("a", 0.0);
        let action = Action {
            kind: ActionKind::PhaseNudge,
            value: 0.3,
            cost: 2.0,
            benefit: 0.0,
        };
        let cost_applied = agent.apply_action(&action).unwrap();
        assert_eq!(cost_applied, 2.0);
        assert!((agent.phase() - 0.3).abs() < 1e-9);
        assert_eq!(agent.energy(), MAX_ENERGY - 2.0);
    }

    #[test]
    fn apply_action_maintain_only_debits_energy() {
        let agent = build_agent("a", 0.7);
        let action = Action::maintain(1.5, 0.0);
        agent.apply_action(&action).unwrap();
        assert_eq!(agent.phase(), 0.7);
        assert_eq!(agent.energy(), MAX_ENERGY - 1.5);
    }

    #[test]
    fn full_stubbornness_always_rejects_proposals() {
        let agent = build_agent("a", 0.0);
        agent.set_stubbornness(1.0);
        agent.update_context();
        let target = State::new(1.0, Duration::from_millis(100), 0.8);
        let random = DefaultRandomSource;
        let (action, accepted) = agent.propose_adjustment(&target, &random);
        assert!(!accepted);
        assert_eq!(action.kind, ActionKind::Maintain);
    }

    #[test]
    fn phase_stays_in_domain_after_many_ticks() {
        let agent = build_agent("a", 6.0);
        agent.set_stubbornness(0.0);
        let target = State::new(0.0, Duration::from_millis(100), 0.9);
        let random = DefaultRandomSource;
        for _ in 0..200 {
            agent.tick(&target, &random);
            assert!((0.0..std::f64::consts::TAU).contains(&agent.phase()));
            assert!(agent.energy() >= 0.0 && agent.energy() <= MAX_ENERGY);
        }
    }

    #[test]
    fn dangling_weak_handle_never_upgrades() {
        let dangling: Weak<Agent> = Weak::new();
        assert!(dangling.upgrade().is_none());
    }
}
