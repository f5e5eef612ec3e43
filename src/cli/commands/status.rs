//! status command - Show branches and pending changes

use anyhow::Result;

use crate::engine::{self, Context, StatusReport};
use crate::ui::output;

/// Print the repository status.
pub fn status(ctx: &Context) -> Result<()> {
    let repo = engine::open(ctx)?;
    let report = engine::status(&repo)?;
    output::print(format_report(&report), super::verbosity(ctx));
    Ok(())
}

fn format_report(report: &StatusReport) -> String {
    let branches: Vec<String> = report
        .branches
        .iter()
        .map(|b| {
            if b == &report.branch {
                format!("*{}", b)
            } else {
                b.to_string()
            }
        })
        .collect();
    let staged: Vec<String> = report
        .staged
        .iter()
        .map(|(path, status)| format!("{:<12}{}", format!("{}:", status), path))
        .collect();
    let unstaged: Vec<String> = report
        .unstaged
        .iter()
        .map(|(path, change)| format!("{} ({})", path, change))
        .collect();

    let mut text = [
        section("Branches", &branches),
        section("Staged Files", &staged),
        section("Unstaged Changes", &unstaged),
        section("Untracked Files", &report.untracked),
    ]
    .join("\n");
    if report.is_clean() {
        text.push_str("\nNothing to commit, working tree clean.");
    }
    text
}

fn section(title: &str, lines: &[String]) -> String {
    let mut out = format!("=== {} ===\n", title);
    if !lines.is_empty() {
        out.push_str(&output::format_list(lines, ""));
        out.push('\n');
    }
    out
}
