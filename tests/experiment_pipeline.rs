use std::fs;

use swarmlab::experiment::run_from_config;

fn write_config(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn yaml_config_runs_sweeps_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(
        dir.path(),
        "experiment.yaml",
        r#"
metadata:
  name: smoke
simulation:
  num_agents: 3
  initial_states: [0.0, 0.5, 1.0]
  rule: average
  steps: 5
sweeps:
  - name: averaging
    overrides: {}
  - name: voting
    overrides:
      initial_states: [1.0, 1.0, 0.0]
      rule: majority
      steps: 2
output:
  save_history: true
"#,
    );

    let out_dir = dir.path().join("results");
    let outputs = run_from_config(&config_path, Some(out_dir.clone()))
        .await
        .unwrap();

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0], out_dir.join("averaging.json"));
    assert_eq!(outputs[1], out_dir.join("voting.json"));

    let averaging: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outputs[0]).unwrap()).unwrap();
    assert_eq!(averaging["steps"], 5);
    assert_eq!(averaging["history"].as_array().unwrap().len(), 6);

    let voting: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outputs[1]).unwrap()).unwrap();
    assert_eq!(voting["rule"], "majority");
    assert_eq!(voting["converged"], true);
    let final_state = voting["final_state"].as_object().unwrap();
    assert!(final_state.values().all(|v| v.as_f64() == Some(1.0)));
}

#[tokio::test]
async fn json_config_without_sweeps_runs_base_block() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(
        dir.path(),
        "single.json",
        r#"{
  "simulation": {
    "num_agents": 2,
    "initial_states": [0.0, 1.0],
    "rule": "average",
    "steps": 1
  },
  "output": { "save_history": false }
}"#,
    );

    let out_dir = dir.path().join("results");
    let outputs = run_from_config(&config_path, Some(out_dir.clone()))
        .await
        .unwrap();

    // Label falls back to the config file stem.
    assert_eq!(outputs, vec![out_dir.join("single.json")]);

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&outputs[0]).unwrap()).unwrap();
    assert!(record.get("history").is_none());

    // One synchronous average step over [0.0, 1.0] meets in the middle.
    let final_state = record["final_state"].as_object().unwrap();
    assert_eq!(final_state["0"].as_f64(), Some(0.5));
    assert_eq!(final_state["1"].as_f64(), Some(0.5));
}

#[tokio::test]
async fn invalid_config_aborts_before_writing_anything() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(
        dir.path(),
        "bad.yaml",
        r#"
simulation:
  num_agents: 3
  initial_states: [0.0, 1.0]
  rule: average
  steps: 5
"#,
    );

    let out_dir = dir.path().join("results");
    let result = run_from_config(&config_path, Some(out_dir.clone())).await;

    assert!(result.is_err());
    assert!(!out_dir.exists());
}

#[tokio::test]
async fn unsupported_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), "config.toml", "simulation = {}");

    let result = run_from_config(&config_path, None).await;
    assert!(result.is_err());
}
