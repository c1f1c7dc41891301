use serde::{Deserialize, Serialize};

use crate::error::SwarmError;

use super::agent::{Agent, AgentId, Snapshot};
use super::rules::BuiltinRule;
use super::swarm::Swarm;

/// Convergence threshold applied when the config does not set one.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Outcome of one consensus run: the full state history (initial snapshot
/// plus one snapshot per step) and the convergence verdict over the final
/// snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub history: Vec<Snapshot>,
    pub converged: bool,
}

impl ConsensusResult {
    pub fn final_states(&self) -> &Snapshot {
        self.history.last().expect("history always holds the initial snapshot")
    }
}

/// Drives consensus runs with a rule selected by name.
///
/// The rule name is validated at construction, before any swarm is built
/// or any step executes.
#[derive(Debug, Clone)]
pub struct ConsensusSimulator {
    rule: BuiltinRule,
}

impl ConsensusSimulator {
    pub fn new(rule: &str) -> Result<Self, SwarmError> {
        Ok(Self { rule: rule.parse()? })
    }

    pub fn with_rule(rule: BuiltinRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> BuiltinRule {
        self.rule
    }

    /// Execute the full requested step count and judge convergence on the
    /// final snapshot only. Intermediate snapshots are never checked and
    /// the run never terminates early; callers wanting early stopping can
    /// inspect the returned history themselves.
    pub fn run(&self, swarm: &mut Swarm, steps: usize, tolerance: f64) -> ConsensusResult {
        let history = swarm.run(&self.rule.as_fn(), steps);
        let converged = history
            .last()
            .map_or(true, |snapshot| has_converged(snapshot, tolerance));
        ConsensusResult { history, converged }
    }
}

/// Spread of the snapshot (max - min) at or below `tolerance`. An empty
/// snapshot counts as converged vacuously.
fn has_converged(snapshot: &Snapshot, tolerance: f64) -> bool {
    let mut values = snapshot.values();
    let Some(&first) = values.next() else {
        return true;
    };

    let (min, max) = values.fold((first, first), |(min, max), &v| {
        (min.min(v), max.max(v))
    });
    max - min <= tolerance
}

/// Build a fully-connected swarm from per-index initial states and run it.
///
/// Agent ids are the indices of `initial_states`; neighbor lists span
/// `0..num_agents`. Checking that `initial_states.len()` matches
/// `num_agents` is the caller's job (the config layer does it before
/// invoking this), keeping the simulation core free of shape validation.
pub fn run_consensus(
    num_agents: usize,
    initial_states: &[f64],
    rule: &str,
    steps: usize,
) -> Result<ConsensusResult, SwarmError> {
    let simulator = ConsensusSimulator::new(rule)?;

    let agents = initial_states.iter().enumerate().map(|(idx, &state)| {
        let id = idx as AgentId;
        let neighbors = (0..num_agents as AgentId).filter(|&j| j != id).collect();
        Agent::new(id, state, neighbors)
    });

    let mut swarm = Swarm::new(agents);
    Ok(simulator.run(&mut swarm, steps, DEFAULT_TOLERANCE))
}
