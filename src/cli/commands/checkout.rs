//! checkout command - Switch branches or restore files

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::engine::{self, CheckoutOutcome, Context, RestoreOutcome};
use crate::ui::output;
use crate::ui::prompts::TerminalConfirm;

/// Switch to another branch.
pub fn checkout_branch(ctx: &Context, name: &str) -> Result<()> {
    let repo = engine::open(ctx)?;
    let mut confirm = TerminalConfirm::new(ctx);
    let outcome = engine::checkout_branch(&repo, name, &mut confirm)
        .with_context(|| format!("Failed to check out '{}'", name))?;

    let v = verbosity(ctx);
    match outcome {
        CheckoutOutcome::AlreadyActive(branch) => {
            output::print(format!("Already on '{}'.", branch), v)
        }
        CheckoutOutcome::Declined => output::print("Aborted.", v),
        CheckoutOutcome::Switched { branch, .. } => {
            output::print(format!("Switched to branch '{}'.", branch), v)
        }
    }
    Ok(())
}

/// Restore files from a commit.
pub fn checkout_files(ctx: &Context, commit: &str, paths: &[PathBuf]) -> Result<()> {
    let cwd = ctx.working_dir()?;
    let repo = engine::open(ctx)?;
    let mut confirm = TerminalConfirm::new(ctx);
    let outcome = engine::checkout_files(&repo, &cwd, commit, paths, &mut confirm)
        .context("Failed to restore files")?;

    let v = verbosity(ctx);
    match outcome {
        RestoreOutcome::Declined => output::print("Aborted.", v),
        RestoreOutcome::Restored { commit, paths } => {
            output::print(
                format!("Restored {} file(s) from {}.", paths.len(), commit.short(8)),
                v,
            );
        }
    }
    Ok(())
}
