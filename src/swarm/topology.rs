//! Topology builders — wire every agent's `NeighborSet` once at swarm
//! construction (spec §4.8). Every builder must produce a symmetric
//! graph: `u` connected to `v` iff `v` connected to `u`.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::agent::Agent;
use crate::error::{CoreError, CoreResult};
use crate::random::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    FullyConnected,
    Ring,
    Star,
    SmallWorld,
}

fn connect(agents: &[Arc<Agent>], i: usize, j: usize) {
    agents[i].add_neighbor(agents[j].id.clone(), Arc::downgrade(&agents[j]));
    agents[j].add_neighbor(agents[i].id.clone(), Arc::downgrade(&agents[i]));
}

impl Topology {
    pub fn build(&self, agents: &[Arc<Agent>], small_world_probability: f64, random: &dyn RandomSource) -> CoreResult<()> {
        match self {
            Topology::FullyConnected => build_fully_connected(agents),
            Topology::Ring => build_ring(agents),
            Topology::Star => build_star(agents),
            Topology::SmallWorld => build_small_world(agents, small_world_probability, random),
        }
    }
}

fn build_fully_connected(agents: &[Arc<Agent>]) -> CoreResult<()> {
    let n = agents.len();
    let mut edges = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            connect(agents, i, j);
            edges += 1;
        }
    }
    debug!(agents = n, edges, "fully-connected topology wired");
    Ok(())
}

fn build_ring(agents: &[Arc<Agent>]) -> CoreResult<()> {
    let n = agents.len();
    if n < 2 {
        warn!(agents = n, "ring topology needs at least 2 agents");
        return Err(CoreError::InsufficientAgents { needed: 2, got: n });
    }
    for i in 0..n {
        let next = (i + 1) % n;
        connect(agents, i, next);
    }
    debug!(agents = n, edges = n, "ring topology wired");
    Ok(())
}

fn build_star(agents: &[Arc<Agent>]) -> CoreResult<()> {
    let n = agents.len();
    if n < 2 {
        warn!(agents = n, "star topology needs at least 2 agents");
        return Err(CoreError::InsufficientAgents { needed: 2, got: n });
    }
    for i in 1..n {
        connect(agents, 0, i);
    }
    debug!(agents = n, edges = n - 1, "star topology wired");
    Ok(())
}

fn build_small_world(agents: &[Arc<Agent>], probability: f64, random: &dyn RandomSource) -> CoreResult<()> {
    let n = agents.len();
    let mut edges = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            if random.bernoulli(probability) {
                connect(agents, i, j);
                edges += 1;
            }
        }
    }
    debug!(agents = n, edges, probability, "small-world topology wired");
    Ok(())
}
