use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rules::UpdateRule;

/// Unique, stable agent identifier. Built-in factories hand out `0..n`.
pub type AgentId = u64;

/// Immutable view of every agent's state at one point in time, keyed by
/// agent id. Iteration order is ascending id, which keeps serialized
/// output and logs deterministic.
pub type Snapshot = BTreeMap<AgentId, f64>;

/// One participant in the swarm: a scalar state plus the ids it observes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub state: f64,
    pub neighbors: Vec<AgentId>,
}

impl Agent {
    /// The neighbor list must not contain the agent's own id; rules handle
    /// the self contribution explicitly.
    pub fn new(id: AgentId, state: f64, neighbors: Vec<AgentId>) -> Self {
        debug_assert!(
            !neighbors.contains(&id),
            "agent {} must not list itself as a neighbor",
            id
        );
        Self { id, state, neighbors }
    }

    /// Current states of this agent's neighbors, in neighbor-list order.
    ///
    /// Neighbor ids missing from `all_states` are skipped silently rather
    /// than treated as an error, so partial snapshots (e.g. during staged
    /// construction) observe whatever subset is present.
    pub fn observe(&self, all_states: &Snapshot) -> Vec<f64> {
        self.neighbors
            .iter()
            .filter_map(|id| all_states.get(id).copied())
            .collect()
    }

    /// Compute and store the next state from the given pre-step snapshot.
    ///
    /// `all_states` must be captured before any agent of the current step
    /// mutates its state; that shared snapshot is what makes a step
    /// synchronous instead of sequential.
    pub fn update<R>(&mut self, all_states: &Snapshot, rule: &R) -> f64
    where
        R: UpdateRule + ?Sized,
    {
        let observed = self.observe(all_states);
        self.state = rule.next_state(self.state, &observed);
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rules::average;

    fn snapshot(pairs: &[(AgentId, f64)]) -> Snapshot {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_observe_follows_neighbor_list_order() {
        let agent = Agent::new(0, 0.0, vec![2, 1]);
        let states = snapshot(&[(0, 0.0), (1, 0.25), (2, 0.75)]);

        assert_eq!(agent.observe(&states), vec![0.75, 0.25]);
    }

    #[test]
    fn test_observe_skips_missing_neighbors() {
        let agent = Agent::new(0, 0.0, vec![1, 7, 2]);
        let states = snapshot(&[(0, 0.0), (1, 1.0), (2, 2.0)]);

        assert_eq!(agent.observe(&states), vec![1.0, 2.0]);
    }

    #[test]
    fn test_update_mutates_state_and_returns_it() {
        let mut agent = Agent::new(0, 0.0, vec![1]);
        let states = snapshot(&[(0, 0.0), (1, 1.0)]);

        let next = agent.update(&states, &average);
        assert_eq!(next, 0.5);
        assert_eq!(agent.state, 0.5);
    }
}
