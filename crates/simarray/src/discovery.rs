//! Folder discovery by naming convention.
//!
//! Generated folders are found again later purely by their name prefix
//! (`sim...` for simulations, `batch_...` for batch containers). Both the
//! archiver and the dispatcher go through these functions so they always
//! agree on what counts as a match.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Whether a directory entry name belongs to the `prefix*` family.
pub fn matches_prefix(name: &str, prefix: &str) -> bool {
    name.starts_with(prefix)
}

/// Directories directly under `dir` whose name starts with `prefix`, sorted
/// by name. Regular files (such as `batch_1.tar.gz`) never match.
pub fn find_prefixed_dirs(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let name = entry.file_name();
        if path.is_dir() && matches_prefix(&name.to_string_lossy(), prefix) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

/// Simulation folders under `dir`.
///
/// With a batch prefix, batch containers are searched one level down as
/// well, and a batch container is never itself reported as a simulation
/// folder even if the simulation prefix would match it.
pub fn find_simulation_dirs(
    dir: &Path,
    sim_prefix: &str,
    batch_prefix: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for path in find_prefixed_dirs(dir, sim_prefix)? {
        let is_batch = batch_prefix.is_some_and(|prefix| {
            path.file_name()
                .is_some_and(|name| matches_prefix(&name.to_string_lossy(), prefix))
        });
        if !is_batch {
            found.push(path);
        }
    }

    if let Some(prefix) = batch_prefix {
        for batch in find_prefixed_dirs(dir, prefix)? {
            found.extend(find_prefixed_dirs(&batch, sim_prefix)?);
        }
    }

    Ok(found)
}
