//! Chat commands addressed to the bot.
//!
//! [`CommandInterpreter`] turns a channel message into a reply or into the
//! first message of a new pending request.

mod discovery;
mod error;
mod interpreter;
mod parse;

pub use discovery::{ExpiredMember, select_expired};
pub use error::CommandError;
pub use interpreter::{CommandInterpreter, CommandOutcome, CommandSettings};
pub use parse::Command;
