/// `load_config` module: reads the static YAML config and injects secrets from the environment.
///
/// The YAML file never holds credentials. API keys come from the process
/// environment (a `.env` file is loaded by the binary before this runs):
///
/// - `OPENAI_API_KEY`: completion service key. When missing, summaries are
///   switched off with a warning instead of failing every file.
/// - `GITHUB_TOKEN`: optional bearer token for the repository host.
///
/// All errors use `anyhow::Error` and surface at the CLI boundary.
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Load `path`, or the defaults when `path` is `None`, then inject secrets.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Config> {
    let config = match path {
        Some(path) => read_config_file(path.as_ref())?,
        None => {
            info!("No config file given, using defaults");
            Config::default()
        }
    };
    let config = inject_env(config);
    config.trace_loaded();
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    info!(config_path = ?path, "Loading configuration from file");

    let content = fs::read_to_string(path)
        .map_err(|e| {
            error!(error = ?e, config_path = ?path, "Failed to read config file");
            e
        })
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    // An empty document deserializes as unit, not as an empty mapping.
    if content.trim().is_empty() {
        info!(config_path = ?path, "Config file is empty, using defaults");
        return Ok(Config::default());
    }

    let config: Config = serde_yaml::from_str(&content).map_err(|e| {
        error!(error = ?e, config_path = ?path, "Failed to parse config YAML");
        anyhow::anyhow!("Failed to parse config YAML: {e}")
    })?;
    info!(config_path = ?path, "Parsed config YAML successfully");

    if config.pipeline.concurrency == 0 {
        anyhow::bail!("pipeline.concurrency must be at least 1");
    }
    Ok(config)
}

fn inject_env(mut config: Config) -> Config {
    config.summarize.api_key = non_empty_env(OPENAI_API_KEY_ENV);
    if config.summarize.enabled && config.summarize.api_key.is_none() {
        warn!(
            var = OPENAI_API_KEY_ENV,
            "Completion API key not set, summaries disabled"
        );
        config.summarize.enabled = false;
    }

    config.remote.token = non_empty_env(GITHUB_TOKEN_ENV);
    info!(
        github_token_set = config.remote.token.is_some(),
        "Environment secrets injected"
    );
    config
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}
