//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository from the context's working directory
//! 2. Calls the engine to execute the command
//! 3. Formats and displays the outcome
//!
//! Handlers do NOT perform repository mutations directly.

mod branch;
mod checkout;
mod commit;
mod info;
mod init;
mod log_cmd;
mod merge;
mod stage;
mod status;

pub use branch::{mkbranch, rmbranch};
pub use checkout::{checkout_branch, checkout_files};
pub use commit::commit;
pub use info::info;
pub use init::init;
pub use log_cmd::log;
pub use merge::merge;
pub use stage::{stage, unstage};
pub use status::status;

use anyhow::Result;

use crate::cli::args::{CheckoutTarget, Command};
use crate::engine::Context;
use crate::ui::output::Verbosity;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Init => init::init(ctx),
        Command::Stage { paths } => stage::stage(ctx, &paths),
        Command::Unstage { paths } => stage::unstage(ctx, &paths),
        Command::Commit { message } => commit::commit(ctx, &message),
        Command::Log => log_cmd::log(ctx),
        Command::Status => status::status(ctx),
        Command::Checkout { target } => match target {
            CheckoutTarget::Branch { name } => checkout::checkout_branch(ctx, &name),
            CheckoutTarget::Files { commit, paths } => {
                checkout::checkout_files(ctx, &commit, &paths)
            }
        },
        Command::Mkbranch { name, commit } => branch::mkbranch(ctx, &name, commit.as_deref()),
        Command::Rmbranch { name } => branch::rmbranch(ctx, &name),
        Command::Info { commit, path } => info::info(ctx, &commit, path.as_deref()),
        Command::Merge { branch } => merge::merge(ctx, &branch),
    }
}

fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::of(ctx)
}
