use std::collections::BTreeMap;

use super::agent::{Agent, AgentId, Snapshot};
use super::rules::UpdateRule;

/// Fixed collection of agents advanced together in synchronous steps.
///
/// The swarm owns its agents for the duration of a run; the agent count
/// never changes mid-run. Constructing from agents with duplicate ids
/// keeps the last one, matching plain map-insert semantics.
#[derive(Debug, Clone, Default)]
pub struct Swarm {
    agents: BTreeMap<AgentId, Agent>,
}

impl Swarm {
    pub fn new(agents: impl IntoIterator<Item = Agent>) -> Self {
        let agents = agents
            .into_iter()
            .map(|agent| (agent.id, agent))
            .collect();
        Self { agents }
    }

    /// Every agent neighbors every other agent, all starting from the same
    /// state. Ids are `0..num_agents`; zero agents is a valid (empty) swarm.
    pub fn fully_connected(num_agents: usize, initial_state: f64) -> Self {
        let agents = (0..num_agents as AgentId).map(|id| {
            let neighbors = (0..num_agents as AgentId).filter(|&j| j != id).collect();
            Agent::new(id, initial_state, neighbors)
        });
        Self::new(agents)
    }

    /// Fully-connected swarm whose agent ids are the indices of
    /// `initial_states`.
    pub fn fully_connected_from_states(initial_states: &[f64]) -> Self {
        let count = initial_states.len() as AgentId;
        let agents = initial_states.iter().enumerate().map(|(idx, &state)| {
            let id = idx as AgentId;
            let neighbors = (0..count).filter(|&j| j != id).collect();
            Agent::new(id, state, neighbors)
        });
        Self::new(agents)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Fresh snapshot of all current states, taken on every call.
    pub fn states(&self) -> Snapshot {
        self.agents
            .iter()
            .map(|(&id, agent)| (id, agent.state))
            .collect()
    }

    /// One synchronous step: every agent updates against the same snapshot
    /// captured before any mutation, so no agent observes a value written
    /// during the current step. Iteration order cannot affect the result.
    pub fn step<R>(&mut self, rule: &R) -> Snapshot
    where
        R: UpdateRule + ?Sized,
    {
        let current = self.states();
        for agent in self.agents.values_mut() {
            agent.update(&current, rule);
        }
        self.states()
    }

    /// Run `steps` synchronous steps, returning the initial snapshot
    /// followed by one snapshot per step (`steps + 1` entries total).
    pub fn run<R>(&mut self, rule: &R, steps: usize) -> Vec<Snapshot>
    where
        R: UpdateRule + ?Sized,
    {
        let mut history = Vec::with_capacity(steps + 1);
        history.push(self.states());
        for _ in 0..steps {
            history.push(self.step(rule));
        }
        history
    }
}
