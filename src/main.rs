mod cli;
mod console;
mod error;
mod prompt;

use crate::cli::Cli;
use crate::console::Console;
use crate::error::{ErrorKind, Result};
use crate::prompt::Prompt;
use clap::Parser;
use exn::ResultExt;
use shelf_catalog::Catalog;
use shelf_circulation::{Ledger, PhonePolicy};
use shelf_config::Config;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("shelf: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log.level));

    let catalog = Catalog::new().with_report_sample(config.catalog.report_sample);
    let policy = PhonePolicy::new(config.circulation.phone_min_digits, config.circulation.phone_max_digits)
        .or_raise(|| ErrorKind::Circulation)?;
    tracing::debug!(?config, "Starting console");

    let prompt = Prompt::new(io::stdin().lock(), io::stdout().lock());
    Console::new(&catalog, Ledger::new(policy), prompt).run()
}

/// Logs go to stderr so they never interleave with the menu on stdout.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}
