use crate::schema::SchemaOptions;
use crate::walk::DEFAULT_IGNORE_DIRS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Full run configuration. Every section has defaults, so an empty file (or
/// no file at all) is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub walk: WalkConfig,
    pub pipeline: PipelineConfig,
    pub summarize: SummarizeConfig,
    pub schema: SchemaOptions,
    pub remote: RemoteConfig,
    pub publish: PublishConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            walk: WalkConfig::default(),
            pipeline: PipelineConfig::default(),
            summarize: SummarizeConfig::default(),
            schema: SchemaOptions::default(),
            remote: RemoteConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl Config {
    pub fn trace_loaded(&self) {
        info!(
            output_dir = %self.output_dir.display(),
            ignore_dirs = ?self.walk.ignore_dirs,
            concurrency = self.pipeline.concurrency,
            summarize = self.summarize.enabled,
            min_interval_ms = self.summarize.min_interval_ms,
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Directory names never descended into, at any depth.
    pub ignore_dirs: Vec<String>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            ignore_dirs: DEFAULT_IGNORE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Files processed at the same time. Output order never depends on it.
    pub concurrency: usize,
    /// Embed each parsed file's source text in its record.
    pub include_source: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            include_source: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeConfig {
    pub enabled: bool,
    pub model: String,
    pub base_url: String,
    pub min_interval_ms: u64,
    pub max_prompt_chars: usize,
    pub timeout_secs: u64,
    /// Injected from `OPENAI_API_KEY`, never read from the file.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            min_interval_ms: 1000,
            max_prompt_chars: 12_000,
            timeout_secs: 60,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_base: String,
    /// Whole-request limit for each GitHub call.
    pub timeout_secs: u64,
    /// Injected from `GITHUB_TOKEN`, never read from the file.
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            timeout_secs: 30,
            token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            api_base: "https://codesandbox.io".to_string(),
            timeout_secs: 60,
        }
    }
}
