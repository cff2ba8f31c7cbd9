//!
//! Generates simulation folders from parameter value files, and archives or
//! populates existing ones.
//!
//! Usage: `simarray [FILES...] [--folder DIR] [--target DIR] [--by N] [--compress] ...`

use std::process;

use clap::Parser;
use tracing::error;

use simarray_tools::cli::{run, Cli};

fn main() {
    let cli = Cli::parse();

    simarray_tools::init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        error!("{}", e);
        process::exit(1);
    }
}
