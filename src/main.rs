use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

mod api;
mod cli;
mod config;
mod domain;
mod error;
mod pipeline;

use api::{GitHubClient, OpenAiClient};
use cli::Cli;
use config::Config;
use pipeline::{FixedSkip, Pipeline, RandomSkip, RunOutcome, SkipPolicy};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("Invalid configuration")?;

    let completion = OpenAiClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.http_timeout,
    )
    .context("Failed to build completion client")?;
    let hosting = GitHubClient::new(
        config.github_api_url.clone(),
        config.github_token.clone(),
        config.http_timeout,
    )
    .context("Failed to build GitHub client")?;

    let skip: Box<dyn SkipPolicy> = if config.skip_probability > 0.0 {
        Box::new(RandomSkip::new(config.skip_probability))
    } else {
        Box::new(FixedSkip(false))
    };

    let pipeline = Pipeline::new(&config, &completion, &hosting, skip.as_ref());
    match pipeline.run(Utc::now()).await {
        Ok(RunOutcome::Skipped) => {
            println!("Skipping today's commit.");
        }
        Ok(RunOutcome::GenerationFailed(err)) => {
            println!("⚠️  No snippet generated ({}). Nothing was committed.", err);
        }
        Ok(RunOutcome::Published {
            artifact,
            history_changed,
        }) => {
            println!("✅ Committed: {} to {}", artifact.path, config.repo);
            if let Some(url) = &artifact.commit_url {
                println!("   {}", url);
            }
            if history_changed == Some(true) {
                println!("   History updated in {}", config.history_path);
            }
        }
        Err(err) => {
            error!("{}", err.user_hint());
            return Err(err).context("Publishing failed");
        }
    }

    Ok(())
}
