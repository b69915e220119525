#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! `skills-mcp-postinstall`: run from the package's `postinstall` script.
//!
//! Whatever happens inside, the process exits 0 and writes nothing to stdout.

mod logging;

use clap::error::ErrorKind;
use clap::Parser;
use postinstall_core::version::version_string;
use postinstall_core::{run, Error, InstallContext, Outcome, RunOptions};
use std::panic;
use std::process::ExitCode;
use tracing::{debug, info, info_span, warn};

#[derive(Parser, Debug, Default)]
#[command(name = "skills-mcp-postinstall")]
#[command(
    author,
    version,
    about = "Replace a git-install cache symlink with a real package directory",
    long_about = None
)]
struct Cli {
    /// Enable diagnostics on stderr (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit diagnostics as JSON lines
    #[arg(long)]
    json: bool,

    /// Report what would be done without changing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        // Unknown arguments fall back to a plain run
        Err(_) => Cli::default(),
    };

    let ctx = InstallContext::from_env();
    if ctx.debug_enabled || cli.verbose > 0 {
        logging::init(cli.verbose, cli.json);
    } else {
        panic::set_hook(Box::new(|_| {}));
    }

    let span = info_span!("postinstall", package = %ctx.package_name);
    let _guard = span.enter();
    debug!("{} on {}", version_string(), ctx.platform.as_str());

    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    match panic::catch_unwind(|| run(&ctx, options)) {
        Ok(outcome) => report(&outcome),
        Err(_) => warn!("Postinstall fix panicked; install continues"),
    }

    ExitCode::SUCCESS
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Applied {
            package_dir,
            source,
        } => info!(
            "Materialized {} from {}",
            package_dir.display(),
            source.display()
        ),
        Outcome::Planned(plan) => info!(
            "Would replace symlink {} with a copy of {}",
            plan.destination.display(),
            plan.source.display()
        ),
        Outcome::NotApplicable(skip) => debug!("No changes made: {skip}"),
        Outcome::Failed(Error::Materialize(err)) if !err.original_intact() => warn!(
            "Postinstall fix failed: {err}; the package content is at {}",
            err.staging.display()
        ),
        Outcome::Failed(err) => warn!("Postinstall fix failed: {err}"),
    }
}
