//! Auxiliary file dispatch.
//!
//! Copies a fixed list of files, unmodified and under their own names, into
//! every target folder. All source files are checked before the first copy;
//! a copy that fails midway still leaves the folders done so far populated.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::discovery::find_simulation_dirs;
use crate::error::{Error, Result};

/// A validated set of files to copy into simulation folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    files: Vec<PathBuf>,
}

impl Dispatch {
    /// Validate that every file exists and is a regular file.
    pub fn new(files: Vec<PathBuf>) -> Result<Self> {
        if let Some(missing) = files.iter().find(|f| !f.is_file()) {
            return Err(Error::MissingDispatchFile(missing.clone()));
        }
        Ok(Self { files })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Copy every file into `folder`.
    pub fn into_folder(&self, folder: &Path) -> Result<()> {
        for file in &self.files {
            let Some(name) = file.file_name() else {
                return Err(Error::MissingDispatchFile(file.clone()));
            };
            let dest = folder.join(name);
            fs::copy(file, &dest).map_err(|e| Error::io(&dest, e))?;
            debug!(file = %file.display(), folder = %folder.display(), "Dispatched file");
        }
        Ok(())
    }

    /// Copy every file into each folder. Returns the number of folders.
    pub fn into_folders<P: AsRef<Path>>(&self, folders: &[P]) -> Result<usize> {
        for folder in folders {
            self.into_folder(folder.as_ref())?;
        }
        Ok(folders.len())
    }
}

/// Dispatch into simulation folders found under an existing target
/// directory (`--dispatch-only`).
///
/// With `batch_prefix` set, simulation folders inside batch containers are
/// included too. Finding no folder at all is not an error, only a warning.
pub fn dispatch_existing(
    files: Vec<PathBuf>,
    target: &Path,
    sim_prefix: &str,
    batch_prefix: Option<&str>,
) -> Result<Vec<PathBuf>> {
    if files.is_empty() {
        return Err(Error::NoDispatchFiles);
    }
    let dispatch = Dispatch::new(files)?;

    let folders = find_simulation_dirs(target, sim_prefix, batch_prefix)?;
    if folders.is_empty() {
        warn!(
            target = %target.display(),
            prefix = sim_prefix,
            "No simulation folders found to dispatch files into"
        );
        return Ok(folders);
    }

    dispatch.into_folders(&folders)?;
    info!(
        files = dispatch.files().len(),
        folders = folders.len(),
        "Dispatched files into existing folders"
    );
    Ok(folders)
}
