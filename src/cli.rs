//! Command-line interface: argument parsing and the async `run` entrypoint
//! shared by `main()` and the integration tests.

use crate::completion::OpenAiClient;
use crate::config::Config;
use crate::contract::RepoRef;
use crate::download::GitHubClient;
use crate::load_config::load_config;
use crate::pipeline::{remote_artifact_name, write_artifact, Pipeline};
use crate::publish::{publish_file, CodeSandboxClient};
use crate::rate_limit::RateLimiter;
use crate::summarize::Summarizer;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// CLI for source-atlas: map a source tree into one structural JSON document.
#[derive(Parser)]
#[clap(
    name = "source-atlas",
    version,
    about = "Parse every file of a source tree or GitHub repository into a structural JSON map"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a local directory
    Analyze {
        /// Root directory to walk
        root: PathBuf,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Artifact file name, written inside the configured output_dir
        #[clap(long, default_value = "asts.json")]
        output: String,
    },
    /// Analyze a GitHub repository
    AnalyzeRepo {
        #[clap(long)]
        owner: String,
        #[clap(long)]
        repo: String,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Publish a generated React component as a CodeSandbox preview
    Publish {
        /// File holding the component's source (becomes src/App.js)
        #[clap(long)]
        file: PathBuf,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
    },
}

/// Build the summarizer the config asks for, if any.
pub fn build_summarizer(config: &Config) -> Result<Option<Summarizer>> {
    if !config.summarize.enabled {
        tracing::info!("Summaries disabled");
        return Ok(None);
    }
    let client = OpenAiClient::from_config(&config.summarize)
        .map_err(|e| anyhow::anyhow!("Failed to construct completion client: {e}"))?;
    let limiter = Arc::new(RateLimiter::from_millis(config.summarize.min_interval_ms));
    Ok(Some(Summarizer::new(
        Arc::new(client),
        limiter,
        config.summarize.max_prompt_chars,
    )))
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            root,
            config,
            output,
        } => {
            let config = load_config(config)?;
            let pipeline = Pipeline::new(&config, build_summarizer(&config)?);
            let aggregate = pipeline.analyze_directory(&root).await.map_err(|e| {
                tracing::error!(command = "analyze", error = %e, "Analysis failed");
                anyhow::Error::new(e)
            })?;
            let path = write_artifact(&aggregate, &config.output_dir, &output)?;
            println!(
                "Analyzed {} files, written to {}",
                aggregate.files.len(),
                path.display()
            );
            Ok(())
        }
        Commands::AnalyzeRepo {
            owner,
            repo,
            config,
        } => {
            let config = load_config(config)?;
            let host = GitHubClient::from_config(&config.remote)
                .map_err(|e| anyhow::anyhow!("Failed to construct repository client: {e}"))?;
            let pipeline = Pipeline::new(&config, build_summarizer(&config)?);
            let repo = RepoRef::new(owner, repo);
            let aggregate = pipeline.analyze_remote(&host, &repo).await;
            let path = write_artifact(&aggregate, &config.output_dir, &remote_artifact_name(&repo))?;
            println!(
                "Analyzed {} files of {}/{}, written to {}",
                aggregate.files.len(),
                repo.owner,
                repo.repo,
                path.display()
            );
            Ok(())
        }
        Commands::Publish { file, config } => {
            let config = load_config(config)?;
            let publisher = CodeSandboxClient::from_config(&config.publish)
                .map_err(|e| anyhow::anyhow!("Failed to construct sandbox client: {e}"))?;
            let link = publish_file(&publisher, &file).await?;
            println!("Preview: {}", link.preview_url);
            println!("Editor:  {}", link.editor_url);
            Ok(())
        }
    }
}
