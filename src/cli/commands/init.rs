//! init command - Create a repository

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::core::object::Commit;
use crate::engine::{self, Context};
use crate::ui::output;

/// Create a repository in the working directory.
pub fn init(ctx: &Context) -> Result<()> {
    let cwd = ctx.working_dir()?;
    let (repo, sentinel) = engine::init(&cwd).context("Failed to initialize repository")?;

    let v = verbosity(ctx);
    output::print(
        format!(
            "Initialized empty vms repository in {}",
            repo.paths().repo_dir().display()
        ),
        v,
    );
    output::print(
        format!("[{}] {} {}", repo.default_branch(), sentinel, Commit::SENTINEL_MESSAGE),
        v,
    );
    Ok(())
}
