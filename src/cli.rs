use clap::Parser;
use std::path::PathBuf;

/// Interactive console for managing a library catalog and its loans.
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON). Defaults to `shelf.toml` in
    /// the platform configuration directory, when present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Log filter directive, overriding the configured level (`RUST_LOG`
    /// still wins when set).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}
