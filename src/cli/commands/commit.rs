//! commit command - Record the staged changes

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::engine::{self, CommitOutcome, Context};
use crate::ui::output;

/// Commit the index to the active branch.
pub fn commit(ctx: &Context, message: &str) -> Result<()> {
    let repo = engine::open(ctx)?;
    let outcome = engine::commit(&repo, message).context("Failed to commit")?;

    match outcome {
        CommitOutcome::Committed { id, branch, .. } => {
            output::print(format!("[{} {}] {}", branch, id.short(8), message), verbosity(ctx));
        }
        CommitOutcome::NothingToCommit => {
            output::print("No changes added to the commit.", verbosity(ctx));
        }
    }
    Ok(())
}
