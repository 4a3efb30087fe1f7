//! Performing approved requests.

use std::sync::Arc;

use esa_gatekeeper_core::{Email, ScreenName};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use super::render::{self, Renderer};
use super::request::{PendingRequest, Target};
use crate::esa::AccountDirectory;
use crate::slack::format::{code_block, inline_code};
use crate::slack::{ChatTransport, Message};

/// An approved request and the message tracking it.
#[derive(Debug, Clone)]
pub struct ExecutionJob {
    pub request: PendingRequest,
    pub channel_id: String,
    pub message_ts: String,
    /// The message as returned to the approving click.
    pub message: Message,
}

/// What an execution did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionReport {
    Completed {
        processed: Vec<String>,
    },
    /// Stopped at the first failing target. `position` is 1-based.
    Failed {
        processed: Vec<String>,
        target: String,
        position: usize,
        total: usize,
        error: String,
    },
}

/// Runs approved operations against the account directory, reporting
/// progress by updating the request's message.
#[derive(Clone)]
pub struct Executor {
    chat: Arc<dyn ChatTransport>,
    directory: Arc<dyn AccountDirectory>,
    renderer: Renderer,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("team_name", &self.directory.team_name())
            .finish_non_exhaustive()
    }
}

impl Executor {
    #[must_use]
    pub fn new(
        chat: Arc<dyn ChatTransport>,
        directory: Arc<dyn AccountDirectory>,
        renderer: Renderer,
    ) -> Self {
        Self {
            chat,
            directory,
            renderer,
        }
    }

    /// Run `job` on a background task.
    #[must_use]
    pub fn spawn(&self, job: ExecutionJob) -> JoinHandle<ExecutionReport> {
        let executor = self.clone();
        tokio::spawn(async move { executor.run(job).await })
    }

    /// Run `job` to completion.
    #[instrument(
        skip_all,
        fields(request_id = %job.request.id, kind = %job.request.kind())
    )]
    pub async fn run(&self, job: ExecutionJob) -> ExecutionReport {
        let ExecutionJob {
            request,
            channel_id,
            message_ts,
            mut message,
        } = job;

        message
            .attachments
            .push(self.renderer.execution_started(request.kind()));
        self.publish(&channel_id, &message_ts, &message).await;

        let (report, text) = match &request.target {
            Target::Invite(email) => self.invite(email).await,
            Target::Delete(screen_name) => self.delete(screen_name).await,
            Target::Cleanup(batch) => self.cleanup(batch).await,
        };
        match &report {
            ExecutionReport::Completed { processed } => {
                info!(count = processed.len(), "Execution completed");
                render::mark_success(&mut message, &text);
            }
            ExecutionReport::Failed {
                position, total, ..
            } => {
                error!(position, total, "Execution failed");
                render::mark_error(&mut message, &text);
            }
        }
        self.publish(&channel_id, &message_ts, &message).await;
        report
    }

    async fn publish(&self, channel_id: &str, message_ts: &str, message: &Message) {
        if let Err(e) = self
            .chat
            .update_message(channel_id, message_ts, message)
            .await
        {
            error!(error = %e, "Failed to update execution progress");
        }
    }

    async fn invite(&self, email: &Email) -> (ExecutionReport, String) {
        info!(email = %email, "Inviting account");
        match self.directory.invite(email).await {
            Ok(()) => (
                ExecutionReport::Completed {
                    processed: vec![email.to_string()],
                },
                format!(
                    ":+1: An invitation has been sent to {}. Complete the registration within 72 hours",
                    inline_code(email.as_str())
                ),
            ),
            Err(e) => (
                single_failure(email.as_str(), &e),
                format!(
                    ":x: Failed to invite {}: {e}",
                    inline_code(email.as_str())
                ),
            ),
        }
    }

    async fn delete(&self, screen_name: &ScreenName) -> (ExecutionReport, String) {
        info!(screen_name = %screen_name, "Deleting account");
        match self.directory.delete(screen_name).await {
            Ok(()) => (
                ExecutionReport::Completed {
                    processed: vec![screen_name.to_string()],
                },
                format!(
                    ":+1: Account has been deleted\n{}",
                    code_block(&[self.directory.search_url(screen_name)])
                ),
            ),
            Err(e) => (
                single_failure(screen_name.as_str(), &e),
                format!(
                    ":x: Failed to delete {}: {e}",
                    inline_code(screen_name.as_str())
                ),
            ),
        }
    }

    async fn cleanup(&self, batch: &[ScreenName]) -> (ExecutionReport, String) {
        let total = batch.len();
        let mut processed: Vec<String> = Vec::with_capacity(total);
        for (index, screen_name) in batch.iter().enumerate() {
            let position = index + 1;
            info!(screen_name = %screen_name, position, total, "Deleting expired account");
            if let Err(e) = self.directory.delete(screen_name).await {
                let mut text = format!(
                    ":x: Failed to delete {} (failed for target {position}/{total}): {e}",
                    inline_code(screen_name.as_str())
                );
                if !processed.is_empty() {
                    text.push_str("\nAlready deleted:\n");
                    text.push_str(&code_block(&processed));
                }
                return (
                    ExecutionReport::Failed {
                        processed,
                        target: screen_name.to_string(),
                        position,
                        total,
                        error: e.to_string(),
                    },
                    text,
                );
            }
            processed.push(screen_name.to_string());
        }

        let mut lines = vec![format!("Deleted {total} expired accounts")];
        lines.extend(
            batch
                .iter()
                .map(|screen_name| format!("- {}", self.directory.search_url(screen_name))),
        );
        (
            ExecutionReport::Completed { processed },
            format!(":+1: Expired accounts have been deleted\n{}", code_block(&lines)),
        )
    }
}

fn single_failure(target: &str, error: &impl std::fmt::Display) -> ExecutionReport {
    ExecutionReport::Failed {
        processed: Vec::new(),
        target: target.to_string(),
        position: 1,
        total: 1,
        error: error.to_string(),
    }
}
