//! mkbranch / rmbranch commands - Create and delete branches

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::engine::{self, Context};
use crate::ui::output;

/// Create a branch at a commit, or at the current commit.
pub fn mkbranch(ctx: &Context, name: &str, commit: Option<&str>) -> Result<()> {
    let repo = engine::open(ctx)?;
    let (branch, tip) = engine::mkbranch(&repo, name, commit)
        .with_context(|| format!("Failed to create branch '{}'", name))?;
    output::print(
        format!("Created branch '{}' at {}.", branch, tip.short(8)),
        verbosity(ctx),
    );
    Ok(())
}

/// Delete a branch.
pub fn rmbranch(ctx: &Context, name: &str) -> Result<()> {
    let repo = engine::open(ctx)?;
    let branch = engine::rmbranch(&repo, name)
        .with_context(|| format!("Failed to delete branch '{}'", name))?;
    output::print(format!("Deleted branch '{}'.", branch), verbosity(ctx));
    Ok(())
}
