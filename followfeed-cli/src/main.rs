// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Followfeed CLI - recent activity of a followed account.
//!
//! # Examples
//!
//! ```bash
//! # What has alice been up to?
//! FOLLOWFEED_USERNAME=me FOLLOWFEED_PASSWORD=... followfeed alice
//!
//! # Same, keeping the session cache somewhere else
//! followfeed --user alice --settings-path ~/.cache/followfeed/settings
//!
//! # Fail instead of printing partial results when a page errors
//! followfeed alice --strict-pages
//!
//! # Debug logging on stderr
//! followfeed alice -v
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use followfeed_fetch::SessionError;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::activity;

// ============================================================================
// CLI Definition
// ============================================================================

/// Followfeed CLI - recent activity of a followed account.
#[derive(Parser, Debug)]
#[command(name = "followfeed")]
#[command(about = "Show what an account you follow has been doing lately")]
#[command(long_about = r#"
Followfeed logs in to the private API (or reuses the cached session in the
settings file), walks the "following" activity feed to the end and prints
every story acted by the target account as a JSON array.

The login account comes from --login, FOLLOWFEED_USERNAME or the config
file. The password comes from FOLLOWFEED_PASSWORD or the config file.

Exit codes:
  0   success (including "no recent activity")
  1   general error
  2   usage error
  9   credentials rejected
  99  unexpected authentication failure

Examples:
  followfeed alice                   # Positional target
  followfeed --user alice            # Same, as a flag
  followfeed alice --strict-pages    # Fail on a broken page
"#)]
#[command(version)]
#[command(author = "Followfeed Contributors")]
#[command(group(ArgGroup::new("account").required(true).args(["target", "user"])))]
pub struct Cli {
    /// Account whose activity to show.
    pub target: Option<String>,

    /// Account whose activity to show (flag form).
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Account to log in as.
    #[arg(long, short = 'l', env = "FOLLOWFEED_USERNAME")]
    pub login: Option<String>,

    /// Session settings file.
    #[arg(long, short = 's')]
    pub settings_path: Option<PathBuf>,

    /// Configuration file.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Override the API base URL.
    #[arg(long)]
    pub api_base: Option<String>,

    /// Fail when a feed page cannot be fetched instead of printing what
    /// was gathered so far.
    #[arg(long)]
    pub strict_pages: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Quiet mode (no log output).
    #[arg(long, short)]
    pub quiet: bool,
}

impl Cli {
    /// The account to report on.
    pub fn target_username(&self) -> Option<&str> {
        self.target.as_deref().or(self.user.as_deref())
    }
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Invalid command line.
    Usage = 2,
    /// Login refused by the platform.
    BadCredentials = 9,
    /// Authentication failed for any other reason.
    Unexpected = 99,
}

impl ExitCode {
    /// Picks the exit code for a failed run.
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<SessionError>() {
            Some(SessionError::CredentialsRejected(_)) => ExitCode::BadCredentials,
            Some(SessionError::SettingsCorrupt(_) | SessionError::Unexpected(_)) => {
                ExitCode::Unexpected
            }
            Some(SessionError::UserLookup { .. }) | None => ExitCode::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let default = if verbose {
        "followfeed=debug,warn"
    } else {
        "followfeed=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::Usage
            } else {
                ExitCode::Success
            };
            e.print()?;
            std::process::exit(code as i32);
        }
    };

    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = activity::run(&cli).await {
        eprintln!("Error: {e}");
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}
