//! Markdown display for every pipeline artifact.
//!
//! Domain models implement [`std::fmt::Display`] directly; collections get
//! newtype wrappers. All output is markdown, rendered by the CLI with
//! termimad or shown as-is.
//!
//! - [`collections`]: [`PlanSummaries`]
//! - [`datetime`]: [`LocalDateTime`] and [`CalendarDate`]
//! - `models`: RTF structures, plans, steps, summaries, conversations
//! - `results`: execution results and status views
//! - `sow`: statements of work

pub mod collections;
pub mod datetime;
mod models;
mod results;
mod sow;


pub use collections::PlanSummaries;
pub use datetime::{CalendarDate, LocalDateTime};
