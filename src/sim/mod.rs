pub mod agent;
pub mod consensus;
pub mod rules;
pub mod swarm;

pub use agent::{Agent, AgentId, Snapshot};
pub use consensus::{run_consensus, ConsensusResult, ConsensusSimulator, DEFAULT_TOLERANCE};
pub use rules::{average, majority, BuiltinRule, UpdateRule};
pub use swarm::Swarm;
