use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{ChatArgs, ParseArgs, PlanArgs, SowArgs};

/// Conversational task planner
///
/// Charter turns a free-text request into a Role/Task/Format structure, an
/// ordered action plan and optionally a statement of work, then executes the
/// plan's steps through an OpenAI-compatible completion endpoint. Without a
/// configured endpoint every stage produces its deterministic fallback.
#[derive(Parser)]
#[command(version, about, name = "charter")]
pub struct Args {
    /// Path to the JSON config file. Defaults to
    /// $XDG_CONFIG_HOME/charter/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the Role/Task/Format structure of a request
    #[command(alias = "r")]
    Parse(ParseArgs),
    /// Build an action plan for a request and optionally execute it
    #[command(alias = "p")]
    Plan(PlanArgs),
    /// Generate a statement of work for a request
    #[command(alias = "s")]
    Sow(SowArgs),
    /// Feed messages into a planning conversation and show its state
    #[command(alias = "c")]
    Chat(ChatArgs),
}
