//! `mig-core` binary entry point.

use clap::Parser;
use mig_core::cli::{self, Cli};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays parseable (`--format json`, `sample`).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    std::process::exit(cli::run(cli).as_i32());
}
