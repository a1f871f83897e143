//! Command arguments and their handlers.
//!
//! Each subcommand has a clap `Args` struct and a handler on [`Cli`] that
//! drives the [`StateManager`] and hands the resulting artifact to the
//! renderer. Plans live in memory, so a plan is created, refined and executed
//! within one invocation.

use anyhow::{Context, Result};
use charter_core::{
    models::MessageRole, ExecuteOptions, ExecutionResult, Plan, PlanContext, SowOptions,
    SowSource, StateManager, StepEvent,
};
use clap::Args;
use jiff::civil::Date;
use log::info;
use serde::Serialize;
use serde_json::Map;

use crate::renderer::TerminalRenderer;

/// Extract the Role/Task/Format structure of a request
#[derive(Args)]
pub struct ParseArgs {
    /// The request in plain language
    pub input: String,
    /// Earlier conversation text that gives the request context
    #[arg(long)]
    pub context: Option<String>,
    /// Print JSON instead of markdown
    #[arg(long)]
    pub json: bool,
}

/// Build an action plan for a request
#[derive(Args)]
pub struct PlanArgs {
    /// The request in plain language
    pub input: String,
    /// Earlier conversation text that gives the request context
    #[arg(long)]
    pub context: Option<String>,
    /// Session whose conversation is seeded with the plan
    #[arg(long)]
    pub session: Option<String>,
    /// Feedback applied to the plan after creation; may be repeated
    #[arg(long = "refine", value_name = "FEEDBACK")]
    pub refinements: Vec<String>,
    /// Also generate a statement of work
    #[arg(long)]
    pub sow: bool,
    /// Labor rate for the statement of work budget
    #[arg(long, requires = "sow")]
    pub hourly_rate: Option<f64>,
    /// Execute every step after planning
    #[arg(long, conflicts_with = "step")]
    pub execute: bool,
    /// Execute only the first attemptable step
    #[arg(long)]
    pub step: bool,
    /// Print JSON instead of markdown
    #[arg(long)]
    pub json: bool,
}

/// Generate a statement of work for a request
#[derive(Args)]
pub struct SowArgs {
    /// The request in plain language
    pub input: String,
    /// Labor rate for the budget
    #[arg(long)]
    pub hourly_rate: Option<f64>,
    /// Working hours per day used for the timeline
    #[arg(long)]
    pub hours_per_day: Option<f64>,
    /// First day of the timeline (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<Date>,
    /// Leave the budget out of the document
    #[arg(long)]
    pub no_budget: bool,
    /// Print JSON instead of markdown
    #[arg(long)]
    pub json: bool,
}

impl SowArgs {
    fn options(&self) -> SowOptions {
        SowOptions {
            hourly_rate: self.hourly_rate,
            hours_per_day: self.hours_per_day,
            include_budget: !self.no_budget,
            start_date: self.start_date,
            ..SowOptions::default()
        }
    }
}

/// Feed messages into a planning conversation
#[derive(Args)]
pub struct ChatArgs {
    /// User messages, applied in order
    #[arg(required = true)]
    pub messages: Vec<String>,
    /// Conversation session id
    #[arg(long, default_value = "cli")]
    pub session: String,
    /// Print JSON instead of markdown
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanReport {
    plan: Plan,
    #[serde(skip_serializing_if = "Option::is_none")]
    execution: Option<ExecutionResult>,
}

pub struct Cli {
    manager: StateManager,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(manager: StateManager, renderer: TerminalRenderer) -> Self {
        Self { manager, renderer }
    }

    pub async fn parse(&self, args: ParseArgs) -> Result<()> {
        let rtf = self
            .manager
            .parse_rtf(&args.input, args.context.as_deref())
            .await
            .context("Failed to parse request")?;

        if args.json {
            self.renderer.render_json(&rtf)
        } else {
            self.renderer.render(&rtf.to_string());
            Ok(())
        }
    }

    pub async fn plan(&self, args: PlanArgs) -> Result<()> {
        let mut context = PlanContext {
            session_id: args.session.clone(),
            context: args.context.clone(),
            ..PlanContext::default()
        };
        if args.sow {
            context = context.with_sow(SowOptions {
                hourly_rate: args.hourly_rate,
                ..SowOptions::default()
            });
        }

        let plan = self
            .manager
            .create_task_plan(&args.input, &context)
            .await
            .context("Failed to create plan")?;

        for feedback in &args.refinements {
            self.manager
                .refine_plan(&plan.id, feedback, args.session.as_deref())
                .await
                .with_context(|| format!("Failed to refine plan {}", plan.id))?;
        }

        let execution = if args.execute || args.step {
            let options = ExecuteOptions {
                auto_execute: args.execute,
                ..ExecuteOptions::default()
            }
            .with_callback(|step, event| {
                if event != StepEvent::Started {
                    info!("Step {} {}", step.id(), event.as_str());
                }
            });
            let result = self
                .manager
                .execute_plan(&plan.id, &options)
                .await
                .with_context(|| format!("Failed to execute plan {}", plan.id))?;
            Some(result)
        } else {
            None
        };

        let plan = self
            .manager
            .get_plan_status(&plan.id)
            .await
            .plan
            .with_context(|| format!("Plan {} disappeared", plan.id))?;

        if args.json {
            return self.renderer.render_json(&PlanReport { plan, execution });
        }

        self.renderer.render(&plan.to_string());
        if let Some(sow) = &plan.sow_document {
            self.renderer.render(&sow.to_string());
        }
        if let Some(result) = &execution {
            self.renderer.render(&result.to_string());
        }
        Ok(())
    }

    pub async fn sow(&self, args: SowArgs) -> Result<()> {
        let rtf = self
            .manager
            .parse_rtf(&args.input, None)
            .await
            .context("Failed to parse request")?;
        let sow = self
            .manager
            .generate_sow(SowSource::Rtf(&rtf), &args.options())
            .await
            .context("Failed to generate statement of work")?;

        if args.json {
            self.renderer.render_json(&sow)
        } else {
            self.renderer.render(&sow.to_string());
            Ok(())
        }
    }

    pub async fn chat(&self, args: ChatArgs) -> Result<()> {
        let mut context = None;
        for message in &args.messages {
            let updated = self
                .manager
                .add_message(&args.session, MessageRole::User, message, Map::new())
                .await
                .context("Failed to add message")?;
            context = Some(updated);
        }
        let context = context.context("No messages given")?;

        if args.json {
            self.renderer.render_json(&context)
        } else {
            self.renderer.render(&context.to_string());
            Ok(())
        }
    }
}
