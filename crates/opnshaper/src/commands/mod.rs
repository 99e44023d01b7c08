//! Command dispatch: bridges CLI args -> shaper operations -> output formatting.

pub mod config_cmd;
pub mod pipes;
pub mod queues;
pub mod rules;
pub mod service;
pub mod util;

use opnshaper_core::Shaper;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a firewall-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, shaper: &Shaper, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Pipes(args) => pipes::handle(shaper, args, global).await,
        Command::Queues(args) => queues::handle(shaper, args, global).await,
        Command::Rules(args) => rules::handle(shaper, args, global).await,
        Command::Interfaces => service::interfaces(shaper, global).await,
        Command::Reconfigure => service::reconfigure(shaper, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a firewall connection".into(),
        )),
    }
}
