//! log command - Show the commit log, newest first

use std::fmt::Write as _;

use anyhow::Result;

use crate::engine::{self, Context};
use crate::repo::LogEntry;
use crate::ui::output;

/// Print every logged commit, newest first.
pub fn log(ctx: &Context) -> Result<()> {
    let repo = engine::open(ctx)?;
    let entries = engine::log(&repo)?;

    let blocks: Vec<String> = entries.iter().map(format_entry).collect();
    if !blocks.is_empty() {
        output::print(blocks.join("\n"), super::verbosity(ctx));
    }
    Ok(())
}

fn format_entry(entry: &LogEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "===");
    let _ = writeln!(out, "commit {}", entry.id);
    if let (Some(first), Some(second)) = (&entry.first_parent, &entry.second_parent) {
        let _ = writeln!(out, "Merge: {} {}", first.short(7), second.short(7));
    } else if let Some(parent) = &entry.first_parent {
        let _ = writeln!(out, "Parent: {}", parent.short(7));
    }
    let _ = writeln!(out, "Date: {}", entry.timestamp);
    let _ = writeln!(out, "{}", entry.message);
    out
}
