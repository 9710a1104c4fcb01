use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use srcsync::cli::{Cli, Commands};
use srcsync::output::{self, Verbosity};
use srcsync::sync::SyncError;
use srcsync::{SyncContext, commands};
use std::io;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            let message = match e.downcast_ref::<SyncError>() {
                Some(sync_error) => format!("{}: {e:#}", sync_error.error_type()),
                None => format!("{e:#}"),
            };
            eprintln!("{} {}", "Error:".red().bold(), message);
            process::exit(1);
        }
    }
}

/// Logs go to stderr so stdout stays clean for `scan`, `tree` and diffs
fn init_tracing(verbose: bool) {
    let default = if verbose { "srcsync=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(srcsync::LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Returns `Ok(false)` when the command ran but the exit status must be 1
fn run() -> Result<bool> {
    let cli = Cli::parse();

    if cli.quiet {
        output::set_verbosity(Verbosity::Quiet);
    } else if cli.verbose {
        output::set_verbosity(Verbosity::Verbose);
    }
    init_tracing(cli.verbose);

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(true);
    }

    let ctx = SyncContext::discover(cli.config.as_deref())?;

    match cli.command {
        Commands::Sync { profiles, dry_run } => commands::sync::execute(&ctx, &profiles, dry_run)?,
        Commands::Check { profiles } => return commands::check::execute(&ctx, &profiles),
        Commands::Scan { profile } => commands::scan::execute(&ctx, &profile)?,
        Commands::Tree { profile } => commands::tree::execute(&ctx, &profile)?,
        Commands::Profiles => commands::profiles::execute(&ctx)?,
        Commands::Init {
            profile,
            targets,
            force,
        } => commands::init::execute(&ctx, &profile, &targets, force)?,
        Commands::Completion { .. } => {}
    }

    Ok(true)
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
