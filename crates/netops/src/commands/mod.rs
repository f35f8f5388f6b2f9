//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod alerts;
pub mod breakdowns;
pub mod config_cmd;
pub mod dashboard;
pub mod energy;
pub mod equipment;
pub mod profile;
pub mod reports;
pub mod sites;
pub mod users;
pub mod util;

use netops_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Dashboard => dashboard::handle(controller, global).await,
        Command::Breakdowns(args) => breakdowns::handle(controller, args, global).await,
        Command::Energy(args) => energy::handle(controller, args, global).await,
        Command::Sites(args) => sites::handle(controller, args, global).await,
        Command::Equipment(args) => equipment::handle(controller, args, global).await,
        Command::Alerts(args) => alerts::handle(controller, args, global).await,
        Command::Users(args) => users::handle(controller, args, global).await,
        Command::Profile(args) => profile::handle(controller, args, global).await,
        Command::Reports(args) => reports::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
