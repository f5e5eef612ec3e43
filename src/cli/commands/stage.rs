//! stage / unstage commands - Edit the index

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::engine::{self, Context};
use crate::ui::output;

/// Stage files, directories, or removed tracked paths.
pub fn stage(ctx: &Context, paths: &[PathBuf]) -> Result<()> {
    let cwd = ctx.working_dir()?;
    let repo = engine::open(ctx)?;
    let report = engine::stage(&repo, &cwd, paths).context("Failed to stage")?;

    let v = verbosity(ctx);
    for path in &report.staged {
        output::print(format!("staged:    {}", path), v);
    }
    for path in &report.deleted {
        output::print(format!("removed:   {}", path), v);
    }
    for path in &report.unchanged {
        output::print(format!("unchanged: {}", path), v);
    }
    Ok(())
}

/// Remove paths from the index.
pub fn unstage(ctx: &Context, paths: &[PathBuf]) -> Result<()> {
    let cwd = ctx.working_dir()?;
    let repo = engine::open(ctx)?;
    let removed = engine::unstage(&repo, &cwd, paths).context("Failed to unstage")?;

    let v = verbosity(ctx);
    for path in &removed {
        output::print(format!("unstaged:  {}", path), v);
    }
    Ok(())
}
