//! Host command dispatch.
//!
//! Decodes a command name plus positional host arguments, validates the
//! call against the command's contract and routes it to the target session.

mod command;
mod dispatcher;
mod reply;

pub use command::{Command, CommandSpec};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use reply::{Reply, STATUS_FAILURE, STATUS_SUCCESS};
