//! Approval workflows.
//!
//! Every invite, delete, and cleanup request goes through the same shape:
//! the owner proposes and confirms, an administrator approves or rejects,
//! and approved requests are executed in the background.
//!
//! This module provides:
//! - [`PendingStore`], the expiring request map
//! - [`WorkflowEngine`], which applies button clicks to stored requests
//! - [`Executor`], which performs approved operations
//! - [`Renderer`], which builds the step attachments

mod action;
mod approvers;
mod engine;
mod execute;
pub mod render;
mod request;
mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};

pub use action::{Action, Permission};
pub use approvers::Approvers;
pub use engine::{Actor, Interaction, Refusal, Transition, Verdict, WorkflowEngine, advance};
pub use execute::{ExecutionJob, ExecutionReport, Executor};
pub use render::{Color, Renderer};
pub use request::{Outcome, PendingRequest, RequestState, Target};
pub use store::PendingStore;

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The wall clock.
#[must_use]
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Errors raised while setting up workflows.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("no administrator could be resolved")]
    NoAdministrators,
}
