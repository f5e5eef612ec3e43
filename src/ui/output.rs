//! ui::output
//!
//! Everything commands print. Results go to stdout and diagnostics to
//! stderr. `--quiet` silences both, except for errors and for data the
//! caller asked for explicitly (file contents from `info`).

use std::fmt::{Display, Write as _};
use std::io::{self, Write};

use crate::engine::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
}

impl Verbosity {
    pub fn of(ctx: &Context) -> Self {
        if ctx.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    fn enabled(self) -> bool {
        self == Verbosity::Normal
    }
}

/// Print a result line.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity.enabled() {
        println!("{message}");
    }
}

/// Write raw bytes to stdout regardless of verbosity.
pub fn data(bytes: &[u8]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.flush()
}

pub fn error(message: impl Display) {
    eprintln!("error: {message}");
}

pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.enabled() {
        eprintln!("warning: {message}");
    }
}

/// One item per line, each behind `indent`.
pub fn format_list<T: Display>(items: &[T], indent: &str) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{indent}{item}");
    }
    out
}

/// Framed banner shown when stored data fails verification.
pub fn integrity_banner(message: impl Display) -> String {
    let rule = "=".repeat(72);
    format!(
        "{rule}\nREPOSITORY INTEGRITY VIOLATION\n{message}\n\
         Stored objects no longer match their ids. Do not commit or merge\n\
         until the object store has been checked or restored from a backup.\n{rule}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_flag_selects_verbosity() {
        let ctx = Context {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(Verbosity::of(&ctx), Verbosity::Quiet);
        assert_eq!(Verbosity::of(&Context::default()), Verbosity::Normal);
    }

    #[test]
    fn list_formatting() {
        assert_eq!(format_list(&["a", "b"], "  "), "  a\n  b");
        assert_eq!(format_list::<&str>(&[], "  "), "");
    }

    #[test]
    fn banner_contains_message() {
        let banner = integrity_banner("object abc hashes to def");
        assert!(banner.contains("INTEGRITY VIOLATION"));
        assert!(banner.contains("object abc hashes to def"));
    }
}
