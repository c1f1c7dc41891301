pub mod core;
pub mod error;
pub mod experiment;
pub mod sim;

pub use error::SwarmError;
pub use sim::{
    average, majority, run_consensus, Agent, AgentId, BuiltinRule, ConsensusResult,
    ConsensusSimulator, Snapshot, Swarm, UpdateRule, DEFAULT_TOLERANCE,
};
