//!
//! Changes the value of one parameter in a parameter file, in place.
//!
//! Usage: `update-value <file> <name> <value>` (quote multi-token values:
//! `update-value parameters.txt scaleI "0 0 0"`)

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use simarray::template::update_file;
use simarray::ParamSeparator;

#[derive(Parser, Debug)]
#[command(name = "update-value")]
#[command(version)]
#[command(about = "Change one parameter's value in a parameter file")]
struct Args {
    /// Parameter file to edit
    file: PathBuf,

    /// Name of the parameter to change
    name: String,

    /// New value (quote vectors)
    #[arg(allow_hyphen_values = true)]
    value: String,

    /// Separator between parameter name and value (default: any whitespace)
    #[arg(long, allow_hyphen_values = true)]
    param_separator: Option<String>,

    /// Verbosity level: 0 (silent), 1 (default), 2 (detailed)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    simarray_tools::init_logging(args.verbose);

    let separator = match ParamSeparator::from_option(args.param_separator.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    match update_file(&args.file, &args.name, &args.value, separator) {
        Ok(true) => info!(
            "Set '{}' to '{}' in {}",
            args.name,
            args.value,
            args.file.display()
        ),
        Ok(false) => warn!(
            "Parameter '{}' not found in {}, file left unchanged",
            args.name,
            args.file.display()
        ),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
