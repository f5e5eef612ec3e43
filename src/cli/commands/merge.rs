//! merge command - Merge a branch into the current branch

use anyhow::{Context as _, Result};

use super::verbosity;
use crate::engine::{self, Context, MergeOutcome};
use crate::ui::output;
use crate::ui::prompts::TerminalConfirm;

/// Merge `branch` into the active branch.
pub fn merge(ctx: &Context, branch: &str) -> Result<()> {
    let repo = engine::open(ctx)?;
    let mut confirm = TerminalConfirm::new(ctx);
    let outcome = engine::merge(&repo, branch, &mut confirm)
        .with_context(|| format!("Failed to merge '{}'", branch))?;

    let v = verbosity(ctx);
    match outcome {
        MergeOutcome::AlreadyMerged { source, target } => {
            output::print(
                format!("'{}' is already merged into '{}'.", source, target),
                v,
            );
        }
        MergeOutcome::Declined => output::print("Aborted.", v),
        MergeOutcome::FastForward {
            target,
            tip,
            updated,
            removed,
            ..
        } => {
            output::print(
                format!(
                    "Fast-forwarded '{}' to {} ({} updated, {} removed).",
                    target,
                    tip.short(8),
                    updated.len(),
                    removed.len()
                ),
                v,
            );
        }
        MergeOutcome::Merged {
            source,
            target,
            id,
            conflicts,
            ..
        } => {
            output::print(
                format!("[{} {}] Merged {} into {}.", target, id.short(8), source, target),
                v,
            );
            if !conflicts.is_empty() {
                output::warn(
                    format!(
                        "merge conflicts were committed with markers in:\n{}",
                        output::format_list(&conflicts, "    ")
                    ),
                    v,
                );
            }
        }
    }
    Ok(())
}
