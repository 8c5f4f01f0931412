use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{create_dir_all, write};
use tempfile::tempdir;

/// Runs `analyze` end to end with summaries switched off (no API key).
#[test]
fn analyze_cli_writes_artifact() {
    let project = tempdir().unwrap();
    create_dir_all(project.path().join("src")).unwrap();
    write(project.path().join("src/App.jsx"), "export default () => <p>hi</p>;").unwrap();
    write(project.path().join("package.json"), r#"{"name":"demo"}"#).unwrap();

    let out = tempdir().unwrap();
    let config = project.path().join("atlas.yaml");
    write(
        &config,
        format!("output_dir: {}\nsummarize:\n  enabled: false\n", out.path().display()),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("source-atlas").expect("Binary exists");
    cmd.arg("analyze")
        .arg(project.path())
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg("map.json")
        .env_remove("OPENAI_API_KEY");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Analyzed 3 files"));

    let text = std::fs::read_to_string(out.path().join("map.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let files: Vec<_> = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["file"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(files, vec!["atlas.yaml", "package.json", "src/App.jsx"]);
}

#[test]
fn analyze_cli_fails_for_missing_root() {
    let out = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("source-atlas").expect("Binary exists");
    cmd.arg("analyze")
        .arg(out.path().join("missing"))
        .env_remove("OPENAI_API_KEY");

    cmd.assert().failure();
    assert!(!out.path().join("asts.json").exists());
}
