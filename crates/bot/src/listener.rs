//! In-order processing of channel messages.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::commands::{CommandInterpreter, CommandOutcome};
use crate::slack::MessageEvent;

/// Capacity of the queue between the Events API endpoint and the listener.
pub const EVENT_QUEUE_CAPACITY: usize = 64;

/// Spawn the listener task.
///
/// Events are handled one at a time. A failed command is logged and its
/// error text posted back to the channel the event came from. The task ends
/// when every sender has been dropped.
pub fn spawn(
    interpreter: Arc<CommandInterpreter>,
    mut events: mpsc::Receiver<MessageEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Command listener started");
        while let Some(event) = events.recv().await {
            match interpreter.handle(&event).await {
                Ok(CommandOutcome::Ignored) => {}
                Ok(outcome) => debug!(outcome = ?outcome, "Command handled"),
                Err(e) => {
                    error!(error = %e, user_id = %event.user, "Command failed");
                    if let Err(e) = interpreter.reply(&event.channel, &e.to_string()).await {
                        error!(error = %e, "Failed to post command error");
                    }
                }
            }
        }
        info!("Command listener stopped");
    })
}
