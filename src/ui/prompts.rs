//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode
//! every confirmation is declined unless `--yes` was given, so a script
//! never overwrites files it did not ask to overwrite.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::engine::{Confirm, Context};

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Prompt for confirmation (yes/no) on stdin.
///
/// An empty answer selects `default`.
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }

    let hint = if default { "[Y/n]" } else { "[y/N]" };
    let mut stderr = io::stderr();
    write!(stderr, "{} {} ", message, hint)?;
    stderr.flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(parse_answer(&input, default))
}

fn parse_answer(input: &str, default: bool) -> bool {
    match input.trim().to_ascii_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    }
}

/// The [`Confirm`] collaborator the CLI hands to the engine.
#[derive(Debug, Clone, Copy)]
pub struct TerminalConfirm {
    interactive: bool,
    assume_yes: bool,
}

impl TerminalConfirm {
    pub fn new(ctx: &Context) -> Self {
        Self {
            interactive: ctx.interactive,
            assume_yes: ctx.assume_yes,
        }
    }
}

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match confirm(message, false, self.interactive) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::debug!(error = %e, "confirmation declined");
                false
            }
        }
    }
}
