use serial_test::serial;
use source_atlas::load_config::{load_config, GITHUB_TOKEN_ENV, OPENAI_API_KEY_ENV};
use std::env;
use std::fs::write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).unwrap();
    file
}

/// A full config file plus env secrets produces the merged configuration.
#[test]
#[serial]
fn test_load_config_reads_yaml_and_injects_env() {
    let file = config_file(
        r#"
output_dir: ./tmp/atlas
walk:
  ignore_dirs: [node_modules, .git, dist]
pipeline:
  concurrency: 2
  include_source: true
summarize:
  model: gpt-4o
  min_interval_ms: 250
schema:
  describe_array_items: true
remote:
  api_base: https://github.example.com/api/v3
  timeout_secs: 5
publish:
  timeout_secs: 120
"#,
    );
    env::set_var(OPENAI_API_KEY_ENV, "sk-test");
    env::set_var(GITHUB_TOKEN_ENV, "ghp-test");

    let config = load_config(Some(file.path())).expect("config should load");

    assert_eq!(config.output_dir, PathBuf::from("./tmp/atlas"));
    assert_eq!(config.walk.ignore_dirs, vec!["node_modules", ".git", "dist"]);
    assert_eq!(config.pipeline.concurrency, 2);
    assert!(config.pipeline.include_source);
    assert!(config.schema.describe_array_items);
    assert_eq!(config.summarize.model, "gpt-4o");
    assert_eq!(config.summarize.min_interval_ms, 250);
    // Unset keys keep their defaults.
    assert_eq!(config.summarize.max_prompt_chars, 12_000);
    assert_eq!(config.remote.api_base, "https://github.example.com/api/v3");
    assert_eq!(config.remote.timeout_secs, 5);
    assert_eq!(config.publish.api_base, "https://codesandbox.io");
    assert_eq!(config.publish.timeout_secs, 120);

    // Secrets come only from the environment.
    assert!(config.summarize.enabled);
    assert_eq!(config.summarize.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.remote.token.as_deref(), Some("ghp-test"));

    env::remove_var(OPENAI_API_KEY_ENV);
    env::remove_var(GITHUB_TOKEN_ENV);
}

#[test]
#[serial]
fn test_missing_api_key_disables_summaries() {
    env::remove_var(OPENAI_API_KEY_ENV);
    env::remove_var(GITHUB_TOKEN_ENV);

    let config = load_config(None::<&Path>).expect("defaults load");
    assert!(!config.summarize.enabled);
    assert!(config.summarize.api_key.is_none());
    assert!(config.remote.token.is_none());
    assert_eq!(config.walk.ignore_dirs, vec!["node_modules"]);
    assert_eq!(config.pipeline.concurrency, 4);
}

#[test]
#[serial]
fn test_empty_file_is_all_defaults() {
    env::set_var(OPENAI_API_KEY_ENV, "sk-test");
    let file = config_file("");

    let config = load_config(Some(file.path())).expect("empty config loads");
    assert_eq!(config.output_dir, PathBuf::from("."));
    assert!(config.summarize.enabled);
    assert_eq!(config.summarize.min_interval_ms, 1000);
    assert_eq!(config.summarize.timeout_secs, 60);
    assert_eq!(config.remote.timeout_secs, 30);
    assert_eq!(config.publish.timeout_secs, 60);

    env::remove_var(OPENAI_API_KEY_ENV);
}

#[test]
#[serial]
fn test_invalid_config_is_an_error() {
    let bad_yaml = config_file("pipeline:\n  concurrency: many\n");
    assert!(load_config(Some(bad_yaml.path())).is_err());

    let zero = config_file("pipeline:\n  concurrency: 0\n");
    let err = load_config(Some(zero.path())).unwrap_err();
    assert!(err.to_string().contains("concurrency"));

    assert!(load_config(Some(Path::new("/definitely/not/here.yaml"))).is_err());
}
