//! Oscillator core: phase math, value types, and the agent itself.

pub mod agent;
pub mod decision;
pub mod goal;
pub mod neighbor;
pub mod phase;
pub mod resource;
pub mod state;

pub use agent::{Agent, AgentBuilder, AgentConfig, MAX_ENERGY};
pub use decision::{build_decision_maker, DecisionMaker, SimpleDecisionMaker};
pub use goal::{build_goal_manager, GoalManager, WeightedGoalManager};
pub use neighbor::{NeighborHandle, NeighborSet};
pub use resource::{build_resource_manager, ResourceManager, TokenBucket};
pub use state::{Action, ActionKind, Context, State};
