//! Charter CLI Application
//!
//! Command-line driver for the charter planning pipeline.

mod args;
mod cli;
mod llm;
mod renderer;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::{Args, Commands};
use charter_core::{CharterConfig, Completion, StateManagerBuilder, UnavailableCompletion};
use clap::Parser;
use cli::Cli;
use llm::OpenAiCompletion;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        config,
        no_color,
        command,
    } = Args::parse();

    let config =
        CharterConfig::load_or_default(config.as_deref()).context("Failed to load configuration")?;

    let completion: Arc<dyn Completion> = match &config.completion {
        Some(settings) => {
            info!("Using completion endpoint {} ({})", settings.base_url, settings.model);
            Arc::new(
                OpenAiCompletion::from_settings(settings)
                    .context("Failed to initialize completion client")?,
            )
        }
        None => {
            info!("No completion endpoint configured, using fallbacks");
            Arc::new(UnavailableCompletion::new("no completion endpoint configured"))
        }
    };

    let manager = StateManagerBuilder::new()
        .with_config(config.pipeline)
        .with_completion(completion)
        .build()
        .context("Failed to initialize state manager")?;

    let cli = Cli::new(manager, TerminalRenderer::new(!no_color));

    match command {
        Parse(args) => cli.parse(args).await,
        Plan(args) => cli.plan(args).await,
        Sow(args) => cli.sow(args).await,
        Chat(args) => cli.chat(args).await,
    }
}
