pub mod runner;

pub use runner::{run_from_config, ExperimentRecord, ExperimentRunner};
