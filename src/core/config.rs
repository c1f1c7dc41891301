use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SwarmError;
use crate::sim::{BuiltinRule, DEFAULT_TOLERANCE};

/// Top-level experiment config, loaded from a YAML or JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub metadata: Metadata,
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub sweeps: Vec<SweepConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub num_agents: usize,
    pub initial_states: Vec<f64>,
    pub rule: String,
    pub steps: usize,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_save_history")]
    pub save_history: bool,
}

/// One sweep entry: a label plus the simulation fields it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overrides: SweepOverrides,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepOverrides {
    #[serde(default)]
    pub num_agents: Option<usize>,
    #[serde(default)]
    pub initial_states: Option<Vec<f64>>,
    #[serde(default)]
    pub rule: Option<String>,
    #[serde(default)]
    pub steps: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub tolerance: Option<f64>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("artifacts/experiments")
}

fn default_save_history() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            save_history: default_save_history(),
        }
    }
}

impl SimulationConfig {
    /// Copy of this block with the sweep's overrides applied on top.
    pub fn merged(&self, overrides: &SweepOverrides) -> SimulationConfig {
        SimulationConfig {
            num_agents: overrides.num_agents.unwrap_or(self.num_agents),
            initial_states: overrides
                .initial_states
                .clone()
                .unwrap_or_else(|| self.initial_states.clone()),
            rule: overrides.rule.clone().unwrap_or_else(|| self.rule.clone()),
            steps: overrides.steps.unwrap_or(self.steps),
            seed: overrides.seed.or(self.seed),
            tolerance: overrides.tolerance.unwrap_or(self.tolerance),
        }
    }

    /// Shape checks that must pass before any simulation step executes.
    pub fn validate(&self) -> Result<(), SwarmError> {
        self.rule.parse::<BuiltinRule>()?;

        if self.initial_states.len() != self.num_agents {
            return Err(SwarmError::InvalidConfiguration(format!(
                "initial_states length {} must match num_agents {}",
                self.initial_states.len(),
                self.num_agents
            )));
        }

        Ok(())
    }
}

impl ExperimentConfig {
    /// Load a config file, picking the parser from the file extension.
    pub fn load(path: &Path) -> Result<Self, SwarmError> {
        let raw = fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => {
                serde_yaml::from_str(&raw).map_err(|e| SwarmError::Parse(e.to_string()))
            }
            "json" => serde_json::from_str(&raw).map_err(|e| SwarmError::Parse(e.to_string())),
            other => Err(SwarmError::UnsupportedFormat(format!(
                "'{}' (expected .yaml, .yml or .json)",
                other
            ))),
        }
    }

    /// Validate the base simulation block and every sweep after merging,
    /// so a bad sweep entry aborts before the first run starts.
    pub fn validate(&self) -> Result<(), SwarmError> {
        self.simulation.validate()?;
        for sweep in &self.sweeps {
            self.simulation.merged(&sweep.overrides).validate()?;
        }
        Ok(())
    }
}
