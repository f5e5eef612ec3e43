//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--yes` / `-y`: Answer yes to every confirmation
//! - `--no-interactive`: Never prompt; confirmations are declined
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// vms - a small content-addressed version control system
#[derive(Parser, Debug)]
#[command(name = "vms")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if vms was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if neither `--no-interactive` nor `--quiet` was set, the
    /// configured default allows prompts, and stdin is a terminal.
    pub fn interactive(&self, configured: bool) -> bool {
        if self.no_interactive || self.quiet {
            false
        } else {
            configured && std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a repository in the current directory
    #[command(
        name = "init",
        long_about = "Create a repository in the current directory.\n\n\
            Writes the .vms directory with an empty index, an empty log, the \
            default branch, and the initial commit every branch descends from. \
            Fails if a repository already exists here or in a parent directory."
    )]
    Init,

    /// Stage files for the next commit
    #[command(
        name = "stage",
        long_about = "Stage files for the next commit.\n\n\
            Directories are staged recursively. A tracked path that no longer \
            exists is staged for removal. A file identical to its committed \
            version is dropped from the index instead.",
        after_help = "\
EXAMPLES:
    vms stage a.txt
    vms stage src/
    vms stage .            # everything under the current directory"
    )]
    Stage {
        /// Files or directories to stage
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Remove paths from the index
    #[command(name = "unstage")]
    Unstage {
        /// Staged files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Record the staged changes
    #[command(name = "commit")]
    Commit {
        /// Commit message
        message: String,
    },

    /// Show the commit log, newest first
    #[command(name = "log")]
    Log,

    /// Show branches, staged, unstaged, and untracked files
    #[command(name = "status")]
    Status,

    /// Switch branches or restore files
    #[command(name = "checkout")]
    Checkout {
        #[command(subcommand)]
        target: CheckoutTarget,
    },

    /// Create a branch
    #[command(
        name = "mkbranch",
        after_help = "\
EXAMPLES:
    vms mkbranch feature           # at the current commit
    vms mkbranch hotfix 3fa9c2d1   # at an older commit"
    )]
    Mkbranch {
        /// Name of the new branch
        name: String,

        /// Commit id (may be abbreviated); defaults to the current commit
        commit: Option<String>,
    },

    /// Delete a branch
    #[command(name = "rmbranch")]
    Rmbranch {
        /// Branch to delete
        name: String,
    },

    /// Show a commit, or one file's content in it
    #[command(
        name = "info",
        after_help = "\
EXAMPLES:
    vms info 3fa9c2d1           # metadata and tracked files
    vms info 3fa9c2d1 a.txt     # content of a.txt in that commit"
    )]
    Info {
        /// Commit id (may be abbreviated)
        commit: String,

        /// File to print
        path: Option<PathBuf>,
    },

    /// Merge a branch into the current branch
    #[command(
        name = "merge",
        long_about = "Merge a branch into the current branch.\n\n\
            If the current branch is an ancestor of the other, it is \
            fast-forwarded. Otherwise a merge commit is created with both \
            tips as parents. Conflicting files are committed with conflict \
            markers and listed so they can be fixed in a follow-up commit."
    )]
    Merge {
        /// Branch to merge in
        branch: String,
    },
}

/// What `checkout` restores.
#[derive(Subcommand, Debug)]
pub enum CheckoutTarget {
    /// Switch to another branch
    Branch {
        /// Branch to switch to
        name: String,
    },

    /// Restore files from a commit
    Files {
        /// Commit id (may be abbreviated)
        commit: String,

        /// Files to restore; all files of the commit when omitted
        paths: Vec<PathBuf>,
    },
}
