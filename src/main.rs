mod check;
mod cli;
mod remote;
mod utils;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use check::threshold::Severity;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose());

    let result = match &cli.command {
        Commands::Updates { ssh, warning, critical, security } => {
            check::run_updates(ssh, warning, critical, *security)
        }
        Commands::Disks { ssh, warning, critical, unit, mounts, exclude } => {
            check::run_disks(ssh, warning, critical, unit, mounts.as_deref(), exclude.as_deref())
        }
    };

    // The SSH session is already closed by the time a result gets here;
    // process::exit below skips destructors.
    let code = match result {
        Ok(report) => {
            println!("{}", check::output::render(&report));
            report.severity.exit_code()
        }
        Err(e) => {
            println!("[{}] {}", Severity::Unknown, e);
            Severity::Unknown.exit_code()
        }
    };
    std::process::exit(code);
}

/// Diagnostics go to stderr; stdout belongs to the poller.
fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
