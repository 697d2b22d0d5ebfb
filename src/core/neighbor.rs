//! Neighbor storage — bounded, cache-friendly set of peer handles.
//!
//! Handles are `Weak<Agent>`: the owning `Arc<Agent>` lives only in the
//! `Swarm`'s agent table, so a neighbor set can never keep a peer alive
//! past the swarm's lifetime (spec §3 "a handle never owns the peer").
//! A `parking_lot::RwLock` guards the backing `Vec`; `snapshot` copies
//! handles out so iteration never holds the lock, matching spec §4.6.

use parking_lot::RwLock;
use std::sync::{Arc, Weak};

use super::agent::Agent;

/// One neighbor entry: the peer's id plus a non-owning handle to it.
#[derive(Clone)]
pub struct NeighborHandle {
    pub id: String,
    pub agent: Weak<Agent>,
}

impl NeighborHandle {
    pub fn upgrade(&self) -> Option<Arc<Agent>> {
        self.agent.upgrade()
    }
}

pub struct NeighborSet {
    entries: RwLock<Vec<NeighborHandle>>,
}

impl NeighborSet {
    pub fn new() -> Self {
        NeighborSet {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Insert a neighbor, replacing any existing entry with the same id.
    /// Refuses self-references (the caller must pass its own id).
    pub fn insert(&self, self_id: &str, id: String, agent: Weak<Agent>) {
        if id == self_id {
            return;
        }
        let mut entries = self.entries.write();
        if let Some(existing) = entries.iter_mut().find(|e| e.id == id) {
            existing.agent = agent;
            return;
        }
        entries.push(NeighborHandle { id, agent });
    }

    /// Remove a neighbor by id via swap-with-last. Returns whether it was present.
    pub fn remove(&self, id: &str) -> bool {
        let mut entries = self.entries.write();
        if let Some(pos) = entries.iter().position(|e| e.id == id) {
            entries.swap_remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freshly allocated copy of all handles, safe to iterate without holding
    /// the lock.
    pub fn snapshot(&self) -> Vec<NeighborHandle> {
        self.entries.read().clone()
    }

    /// Iterate live neighbors, stopping early if `f` returns `false`.
    pub fn for_each_while<F>(&self, mut f: F)
    where
        F: FnMut(&NeighborHandle) -> bool,
    {
        for handle in self.snapshot() {
            if !f(&handle) {
                break;
            }
        }
    }
}

impl Default for NeighborSet {
    fn default() -> Self {
        Self::new()
    }
}
