//! info command - Show a commit or one file in it
//!
//! File content is written to stdout unchanged and is printed even with
//! `--quiet`, since it is the output the caller asked for.

use std::path::Path;

use anyhow::Result;

use crate::core::object::Commit;
use crate::core::types::ObjectId;
use crate::engine::{self, Context, InfoReport};
use crate::ui::output;

/// Print commit metadata, or a file's content when `path` is given.
pub fn info(ctx: &Context, commit: &str, path: Option<&Path>) -> Result<()> {
    let cwd = ctx.working_dir()?;
    let repo = engine::open(ctx)?;

    match engine::info(&repo, &cwd, commit, path)? {
        InfoReport::Commit { id, commit } => {
            output::print(format_commit(&id, &commit), super::verbosity(ctx));
        }
        InfoReport::File { content, .. } => output::data(&content)?,
    }
    Ok(())
}

fn format_commit(id: &ObjectId, commit: &Commit) -> String {
    let mut lines = vec![format!("commit {}", id)];
    if commit.is_merge() {
        let parents: Vec<String> = commit.parents().map(ToString::to_string).collect();
        lines.push(format!("Merge: {}", parents.join(" ")));
    } else if let Some(parent) = commit.first_parent() {
        lines.push(format!("Parent: {}", parent));
    }
    lines.push(format!("Date: {}", commit.timestamp()));
    lines.push(String::new());
    lines.push(format!("    {}", commit.message()));
    lines.push(String::new());
    lines.push(format!("Files ({}):", commit.tree().len()));
    for (path, blob) in commit.tree().iter() {
        lines.push(format!("    {}  {}", blob.short(8), path));
    }
    lines.join("\n")
}
