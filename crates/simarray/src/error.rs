//! Simarray errors

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Simarray result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while generating, archiving or populating simulation folders.
///
/// Every variant is fatal: the run stops at the first one, leaving whatever
/// was already written on disk in place.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No files provided. Use filenames or the --folder option.")]
    NoInputFiles,

    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error(
        "Files do not have the same number of lines: '{}' has {found}, '{}' has {expected}",
        .path.display(),
        .reference.display()
    )]
    RowCountMismatch {
        path: PathBuf,
        found: usize,
        reference: PathBuf,
        expected: usize,
    },

    #[error("template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Duplicate parameter name '{name}' found in the template file.")]
    DuplicateTemplateKey { name: String },

    #[error("simulation folder already exists: {} (remove it before retrying)", .0.display())]
    FolderExists(PathBuf),

    #[error("folder name '{name}' built from input line {line} is not a single path component")]
    InvalidFolderName { name: String, line: usize },

    #[error("several parameter combinations map to the same folder '{0}'")]
    FolderCollision(String),

    #[error("No {kind} folders found matching '{prefix}*' in {}", .dir.display())]
    ArchiveTargetNotFound {
        kind: &'static str,
        prefix: String,
        dir: PathBuf,
    },

    #[error("File '{}' specified in --dispatch does not exist or is not a file.", .0.display())]
    MissingDispatchFile(PathBuf),

    #[error("No files specified for dispatch. Use the --dispatch argument to specify files.")]
    NoDispatchFiles,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Wrap an I/O failure together with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
