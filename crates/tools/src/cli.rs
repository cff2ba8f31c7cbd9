//! `simarray` command-line surface.
//!
//! One flat set of options drives four modes:
//!
//! - generation (default): read parameter files, create folders, then
//!   optionally compress them
//! - `--dry-run`: print the planned folders as JSON lines, touch nothing
//! - `--compress-only`: archive batch (or, with `--compress-all`,
//!   simulation) folders already present in the target
//! - `--dispatch-only`: copy `--dispatch` files into existing simulation
//!   folders

use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing::info;

use simarray::archive::{compress_existing, CompressScope};
use simarray::dispatch::dispatch_existing;
use simarray::{
    materialize, plan, GenerateOptions, MissingKeys, NamingScheme, ParamSeparator,
    ParameterTable,
};

/// Errors surfaced by the command-line tools.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Simarray(#[from] simarray::Error),

    #[error("failed to encode plan: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[derive(Parser, Debug, Clone)]
#[command(name = "simarray")]
#[command(version)]
#[command(about = "SimArray: generate, batch, archive and populate simulation folders")]
pub struct Cli {
    /// Parameter value files, one value per line (file name minus extension = parameter name)
    pub filenames: Vec<PathBuf>,

    /// Directory whose files are all read as parameter value files
    #[arg(long)]
    pub folder: Option<PathBuf>,

    /// Separator used in folder names
    #[arg(long, default_value = "_", allow_hyphen_values = true)]
    pub separator: String,

    /// Directory receiving the simulation folders
    #[arg(long, default_value = ".")]
    pub target: PathBuf,

    /// Number of folders per batch
    #[arg(long)]
    pub by: Option<NonZeroUsize>,

    /// Prefix of batch folder names
    #[arg(long, default_value = "batch_")]
    pub batch_prefix: String,

    /// Prefix of simulation folder names
    #[arg(long, default_value = "sim")]
    pub sim_prefix: String,

    /// Number of replicates per parameter combination
    #[arg(long, default_value_t = 1)]
    pub replicates: u32,

    /// Prefix of replicate identifiers
    #[arg(long, default_value = "r")]
    pub replicate_prefix: String,

    /// Template parameter file copied into every folder
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Name of the parameter file inside each folder (default: template name or parameters.txt)
    #[arg(long)]
    pub output_param_file: Option<String>,

    /// Separator between parameter name and value (default: any whitespace)
    #[arg(long, allow_hyphen_values = true)]
    pub param_separator: Option<String>,

    /// Append parameters missing from the template instead of ignoring them
    #[arg(long)]
    pub append_missing: bool,

    /// Files to copy into each simulation folder
    #[arg(long, num_args = 0..)]
    pub dispatch: Option<Vec<PathBuf>>,

    /// Compress each batch into a tarball (or everything if there are no batches)
    #[arg(long)]
    pub compress: bool,

    /// Name of the global tarball
    #[arg(long, default_value = "all_simulations")]
    pub tarball_name: String,

    /// Only compress folders already present in the target
    #[arg(long, conflicts_with = "dispatch_only")]
    pub compress_only: bool,

    /// With --compress-only, put all simulation folders into one tarball
    #[arg(long, requires = "compress_only")]
    pub compress_all: bool,

    /// Only copy --dispatch files into simulation folders already present in the target
    #[arg(long)]
    pub dispatch_only: bool,

    /// With --dispatch-only, also look inside batch folders
    #[arg(long, requires = "dispatch_only")]
    pub dispatch_recursive: bool,

    /// Print the planned folders as JSON lines without creating anything
    #[arg(long, conflicts_with_all = ["compress_only", "dispatch_only", "compress"])]
    pub dry_run: bool,

    /// Verbosity level: 0 (silent), 1 (default), 2 (detailed)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub verbose: u8,
}

/// What a single invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Generate,
    DryRun,
    CompressOnly,
    DispatchOnly,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.compress_only {
            Mode::CompressOnly
        } else if self.dispatch_only {
            Mode::DispatchOnly
        } else if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Generate
        }
    }

    pub fn naming(&self) -> NamingScheme {
        NamingScheme {
            separator: self.separator.clone(),
            sim_prefix: self.sim_prefix.clone(),
            replicates: self.replicates,
            replicate_prefix: self.replicate_prefix.clone(),
        }
    }

    pub fn generate_options(&self) -> simarray::Result<GenerateOptions> {
        Ok(GenerateOptions {
            target: self.target.clone(),
            naming: self.naming(),
            batch_size: self.by,
            batch_prefix: self.batch_prefix.clone(),
            template: self.template.clone(),
            output_file: self.output_param_file.clone(),
            param_separator: ParamSeparator::from_option(self.param_separator.as_deref())?,
            missing_keys: if self.append_missing {
                MissingKeys::Append
            } else {
                MissingKeys::Ignore
            },
            dispatch: self.dispatch.clone().unwrap_or_default(),
        })
    }

    pub fn compress_scope(&self) -> CompressScope {
        if self.compress_all {
            CompressScope::AllSimulations {
                sim_prefix: self.sim_prefix.clone(),
                tarball_name: self.tarball_name.clone(),
            }
        } else {
            CompressScope::Batches {
                batch_prefix: self.batch_prefix.clone(),
            }
        }
    }
}

/// Execute the invocation described by `cli`.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    match cli.mode() {
        Mode::CompressOnly => {
            info!("Compressing existing folders in {}...", cli.target.display());
            compress_existing(&cli.target, &cli.compress_scope())?;
        }
        Mode::DispatchOnly => {
            let batch_prefix = cli.dispatch_recursive.then_some(cli.batch_prefix.as_str());
            dispatch_existing(
                cli.dispatch.clone().unwrap_or_default(),
                &cli.target,
                &cli.sim_prefix,
                batch_prefix,
            )?;
        }
        Mode::DryRun => {
            let table = ParameterTable::load(&cli.filenames, cli.folder.as_deref())?;
            let planned = plan(&table, &cli.generate_options()?)?;
            let mut out = io::stdout().lock();
            for folder in &planned.folders {
                writeln!(out, "{}", serde_json::to_string(folder)?)?;
            }
            info!(
                "Planned {} folders across {} batches.",
                planned.folders.len(),
                planned.batch_dirs.len()
            );
        }
        Mode::Generate => {
            let table = ParameterTable::load(&cli.filenames, cli.folder.as_deref())?;
            let generation = materialize(&table, &cli.generate_options()?)?;
            info!("Folders created.");

            if cli.verbose >= 1 {
                let mut out = io::stdout().lock();
                for folder in &generation.folders {
                    writeln!(out, "{}", folder.display())?;
                }
            }

            if cli.compress {
                info!("Compressing folders...");
                generation.compress(&cli.tarball_name)?;
            }
        }
    }

    info!("All done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("simarray").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["mutation.txt", "selection.txt"]);

        assert_eq!(cli.mode(), Mode::Generate);
        assert_eq!(cli.filenames.len(), 2);
        assert_eq!(cli.target, PathBuf::from("."));
        assert_eq!(cli.naming(), NamingScheme::default());
        assert_eq!(cli.verbose, 1);

        let options = cli.generate_options().unwrap();
        assert_eq!(options.batch_prefix, "batch_");
        assert_eq!(options.param_separator, ParamSeparator::Whitespace);
        assert_eq!(options.output_file_name(), PathBuf::from("parameters.txt"));
        assert!(options.dispatch.is_empty());
    }

    #[test]
    fn test_dispatch_takes_many_files() {
        let cli = parse(&[
            "--folder",
            "input",
            "--dispatch",
            "dispatch1.txt",
            "dispatch2.txt",
            "--replicates",
            "2",
        ]);
        assert_eq!(
            cli.dispatch,
            Some(vec![
                PathBuf::from("dispatch1.txt"),
                PathBuf::from("dispatch2.txt")
            ])
        );
        assert_eq!(cli.replicates, 2);
    }

    #[test]
    fn test_param_separator_literal() {
        let cli = parse(&["a.txt", "--param-separator", " "]);
        let options = cli.generate_options().unwrap();
        assert_eq!(options.param_separator, ParamSeparator::Literal(" ".to_string()));

        let cli = parse(&["a.txt", "--param-separator", ""]);
        assert!(cli.generate_options().is_err());
    }

    #[test]
    fn test_modes() {
        assert_eq!(parse(&["--compress-only"]).mode(), Mode::CompressOnly);
        assert_eq!(parse(&["--dispatch-only"]).mode(), Mode::DispatchOnly);
        assert_eq!(parse(&["a.txt", "--dry-run"]).mode(), Mode::DryRun);

        let scope = parse(&["--compress-only", "--compress-all", "--tarball-name", "x"])
            .compress_scope();
        assert_eq!(
            scope,
            CompressScope::AllSimulations {
                sim_prefix: "sim".to_string(),
                tarball_name: "x".to_string(),
            }
        );
    }

    #[test]
    fn test_rejected_arguments() {
        let reject = |args: &[&str]| {
            Cli::try_parse_from(std::iter::once("simarray").chain(args.iter().copied())).is_err()
        };

        assert!(reject(&["a.txt", "--by", "0"]));
        assert!(reject(&["a.txt", "--verbose", "3"]));
        assert!(reject(&["--compress-only", "--dispatch-only"]));
        assert!(reject(&["--compress-all"]));
        assert!(reject(&["--dispatch-recursive"]));
    }
}
