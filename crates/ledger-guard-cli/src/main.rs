mod cmd;
mod interrupt;
mod output;
mod settings;

use clap::{Parser, Subcommand};
use ledger_guard_core::{GuardError, StopSignal};
use settings::CheckFlags;
use std::path::PathBuf;

/// Exit code for an operator-initiated stop, matching SIGINT convention.
const EXIT_STOPPED: i32 = 130;

#[derive(Parser)]
#[command(
    name = "ledger-guard",
    about = "Check the ledger index version before the process uses it",
    version,
    propagate_version = true
)]
struct Cli {
    /// Ledger index database file (default: from config, else ./ledger.db)
    #[arg(long, global = true, env = "LEDGER_GUARD_DB")]
    db: Option<PathBuf>,

    /// Config file (default: ./ledger-guard.yaml if present)
    #[arg(long, global = true, env = "LEDGER_GUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the startup lifecycle check and stamp the database version
    Check {
        #[command(flatten)]
        flags: CheckFlags,
    },

    /// Show stored and checkpoint versions and the action `check` would take
    Version {
        #[command(flatten)]
        flags: CheckFlags,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check { flags } => {
            settings::resolve(cli.config.as_deref(), cli.db.as_deref(), &flags).and_then(
                |config| {
                    let stop = StopSignal::new();
                    interrupt::stop_on_ctrl_c(stop.clone());
                    cmd::check::run(&config, &stop, cli.json)
                },
            )
        }
        Commands::Version { flags } => {
            settings::resolve(cli.config.as_deref(), cli.db.as_deref(), &flags)
                .and_then(|config| cmd::version::run(&config, cli.json))
        }
    };

    if let Err(e) = result {
        let code = exit_code(&e);
        if code == EXIT_STOPPED {
            tracing::info!("startup check interrupted; database left unchanged");
        } else {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
        }
        std::process::exit(code);
    }
}

fn exit_code(e: &anyhow::Error) -> i32 {
    let stopped = e
        .chain()
        .filter_map(|cause| cause.downcast_ref::<GuardError>())
        .any(GuardError::is_stopped);
    if stopped {
        EXIT_STOPPED
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn stopped_check_exits_130() {
        let err = Err::<(), _>(GuardError::VerificationStopped)
            .context("startup check")
            .unwrap_err();
        assert_eq!(exit_code(&err), EXIT_STOPPED);
    }

    #[test]
    fn other_failures_exit_1() {
        let err = anyhow::Error::new(GuardError::CorruptDb("block 2 missing".into()));
        assert_eq!(exit_code(&err), 1);
        assert_eq!(exit_code(&anyhow::anyhow!("config validation found errors")), 1);
    }
}
