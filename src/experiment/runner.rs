use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::config::{ExperimentConfig, SimulationConfig};
use crate::sim::{ConsensusSimulator, Snapshot, Swarm};

/// Payload written to disk for each completed run, one JSON file per label.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentRecord {
    pub label: String,
    pub num_agents: usize,
    pub rule: String,
    pub steps: usize,
    pub seed: Option<u64>,
    pub tolerance: f64,
    pub converged: bool,
    pub final_state: Snapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Snapshot>>,
    pub completed_at: DateTime<Utc>,
}

/// Expands a config into individual runs (base simulation plus sweeps),
/// executes them, and writes one result record per run.
pub struct ExperimentRunner {
    config: ExperimentConfig,
    output_dir: PathBuf,
}

impl ExperimentRunner {
    /// Load and validate a config file. Validation failures abort here,
    /// before any run is scheduled.
    pub fn from_file(path: &Path, output_dir: Option<PathBuf>) -> Result<Self> {
        let config = ExperimentConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        config.validate().context("invalid experiment config")?;

        let base_label = config
            .metadata
            .name
            .clone()
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "experiment".to_string());

        let output_dir = output_dir.unwrap_or_else(|| config.output.directory.clone());
        Ok(Self::with_label(config, output_dir, base_label))
    }

    fn with_label(mut config: ExperimentConfig, output_dir: PathBuf, label: String) -> Self {
        config.metadata.name.get_or_insert(label);
        Self { config, output_dir }
    }

    /// Labelled simulation blocks in declaration order: just the base block
    /// when no sweeps are configured, otherwise one entry per sweep.
    pub fn planned_runs(&self) -> Vec<(String, SimulationConfig)> {
        let base_label = self
            .config
            .metadata
            .name
            .clone()
            .unwrap_or_else(|| "experiment".to_string());

        if self.config.sweeps.is_empty() {
            return vec![(base_label, self.config.simulation.clone())];
        }

        self.config
            .sweeps
            .iter()
            .enumerate()
            .map(|(idx, sweep)| {
                let label = sweep
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("{}-{}", base_label, idx));
                (label, self.config.simulation.merged(&sweep.overrides))
            })
            .collect()
    }

    /// Execute every planned run and return the written file paths in
    /// declaration order.
    ///
    /// Runs are independent (each owns its swarm), so they execute on
    /// blocking worker threads in parallel; joining in order keeps the
    /// returned paths and the logs deterministic.
    pub async fn run_all(&self) -> Result<Vec<PathBuf>> {
        let runs = self.planned_runs();
        tracing::info!("🚀 Starting {} experiment run(s)", runs.len());

        let mut handles = Vec::with_capacity(runs.len());
        for (label, simulation) in runs {
            let output_dir = self.output_dir.clone();
            let save_history = self.config.output.save_history;
            handles.push(tokio::task::spawn_blocking(move || {
                run_single(&label, &simulation, &output_dir, save_history)
            }));
        }

        let mut outputs = Vec::with_capacity(handles.len());
        for handle in handles {
            outputs.push(handle.await.context("experiment task panicked")??);
        }

        tracing::info!("✅ All runs finished ({} result files)", outputs.len());
        Ok(outputs)
    }
}

/// Run one simulation block and persist its record. Blocking; callers on
/// the async runtime go through [`ExperimentRunner::run_all`].
pub fn run_single(
    label: &str,
    simulation: &SimulationConfig,
    output_dir: &Path,
    save_history: bool,
) -> Result<PathBuf> {
    tracing::info!(
        "📊 Running experiment '{}' ({} rule, {} agents, {} steps)",
        label,
        simulation.rule,
        simulation.num_agents,
        simulation.steps
    );

    let simulator = ConsensusSimulator::new(&simulation.rule)?;
    let mut swarm = Swarm::fully_connected_from_states(&simulation.initial_states);
    let result = simulator.run(&mut swarm, simulation.steps, simulation.tolerance);

    tracing::info!(
        "🎯 Experiment '{}' finished (converged: {})",
        label,
        result.converged
    );

    let record = ExperimentRecord {
        label: label.to_string(),
        num_agents: simulation.num_agents,
        rule: simulation.rule.clone(),
        steps: simulation.steps,
        seed: simulation.seed,
        tolerance: simulation.tolerance,
        converged: result.converged,
        final_state: result.final_states().clone(),
        history: save_history.then_some(result.history),
        completed_at: Utc::now(),
    };

    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let output_path = output_dir.join(format!("{}.json", label));
    let json = serde_json::to_string_pretty(&record)?;
    fs::write(&output_path, json)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    tracing::info!("💾 Saved results to {}", output_path.display());
    Ok(output_path)
}

/// Convenience entry point mirroring the binary's surface: config file in,
/// result file paths out.
pub async fn run_from_config(path: &Path, output_dir: Option<PathBuf>) -> Result<Vec<PathBuf>> {
    ExperimentRunner::from_file(path, output_dir)?.run_all().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{SweepConfig, SweepOverrides};

    fn config_with_sweeps(sweeps: Vec<SweepConfig>) -> ExperimentConfig {
        let mut config: ExperimentConfig = serde_yaml::from_str(
            r#"
            metadata:
              name: demo
            simulation:
              num_agents: 3
              initial_states: [0.0, 0.5, 1.0]
              rule: average
              steps: 5
            "#,
        )
        .unwrap();
        config.sweeps = sweeps;
        config
    }

    #[test]
    fn test_planned_runs_without_sweeps_uses_base_block() {
        let runner = ExperimentRunner::with_label(
            config_with_sweeps(vec![]),
            PathBuf::from("out"),
            "demo".into(),
        );

        let runs = runner.planned_runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, "demo");
        assert_eq!(runs[0].1.rule, "average");
    }

    #[test]
    fn test_planned_runs_labels_sweeps() {
        let sweeps = vec![
            SweepConfig {
                name: Some("fast".into()),
                overrides: SweepOverrides {
                    steps: Some(1),
                    ..Default::default()
                },
            },
            SweepConfig {
                name: None,
                overrides: SweepOverrides {
                    rule: Some("majority".into()),
                    ..Default::default()
                },
            },
        ];
        let runner = ExperimentRunner::with_label(
            config_with_sweeps(sweeps),
            PathBuf::from("out"),
            "demo".into(),
        );

        let runs = runner.planned_runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].0, "fast");
        assert_eq!(runs[0].1.steps, 1);
        assert_eq!(runs[1].0, "demo-1");
        assert_eq!(runs[1].1.rule, "majority");
        assert_eq!(runs[1].1.steps, 5);
    }

    #[test]
    fn test_run_single_writes_record() {
        let dir = tempfile::tempdir().unwrap();
        let simulation = config_with_sweeps(vec![]).simulation;

        let path = run_single("unit", &simulation, dir.path(), true).unwrap();
        assert!(path.ends_with("unit.json"));

        let raw = fs::read_to_string(&path).unwrap();
        let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(record["label"], "unit");
        assert_eq!(record["rule"], "average");
        assert_eq!(record["history"].as_array().unwrap().len(), 6);
        assert!(record["converged"].is_boolean());
    }

    #[test]
    fn test_run_single_can_omit_history() {
        let dir = tempfile::tempdir().unwrap();
        let simulation = config_with_sweeps(vec![]).simulation;

        let path = run_single("lean", &simulation, dir.path(), false).unwrap();
        let record: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(record.get("history").is_none());
        assert_eq!(record["final_state"].as_object().unwrap().len(), 3);
    }
}
