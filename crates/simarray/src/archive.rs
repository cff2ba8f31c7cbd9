//! Gzip tar archives of simulation folders.
//!
//! Each source folder lands in the archive under its own name, with its
//! whole subtree below it. Members are added in sorted file-name order so
//! the same tree always yields the same member list. Source folders are
//! never removed.

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::discovery::{find_prefixed_dirs, find_simulation_dirs};
use crate::error::{Error, Result};

/// Extension given to every archive.
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// `<dir>/<stem>.tar.gz`
pub fn archive_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, ARCHIVE_EXTENSION))
}

/// Write one archive at `archive` holding every folder in `sources`.
pub fn archive_folders<P: AsRef<Path>>(archive: &Path, sources: &[P]) -> Result<()> {
    let file = File::create(archive).map_err(|e| Error::io(archive, e))?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    for source in sources {
        let source = source.as_ref();
        let root = source
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| Error::InvalidConfig(format!("cannot archive '{}'", source.display())))?;

        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::io(source, e.into()))?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| Error::InvalidConfig(e.to_string()))?;
            let name = if relative.as_os_str().is_empty() {
                root.clone()
            } else {
                root.join(relative)
            };

            if entry.file_type().is_dir() {
                builder
                    .append_dir(&name, entry.path())
                    .map_err(|e| Error::io(entry.path(), e))?;
            } else {
                builder
                    .append_path_with_name(entry.path(), &name)
                    .map_err(|e| Error::io(entry.path(), e))?;
            }
        }
        debug!(source = %source.display(), archive = %archive.display(), "Archived folder");
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| Error::io(archive, e))?;
    Ok(())
}

/// Compress each folder into its own `<folder>.tar.gz` next to it.
pub fn archive_each<P: AsRef<Path>>(folders: &[P]) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::with_capacity(folders.len());
    for folder in folders {
        let folder = folder.as_ref();
        let parent = folder.parent().unwrap_or_else(|| Path::new("."));
        let stem = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::InvalidConfig(format!("cannot archive '{}'", folder.display())))?;
        let archive = archive_path(parent, &stem);

        archive_folders(&archive, &[folder])?;
        info!(
            "Compressed batch folder '{}' into '{}'",
            folder.display(),
            archive.display()
        );
        archives.push(archive);
    }
    Ok(archives)
}

/// Compress all `folders` together into `<target>/<tarball_name>.tar.gz`.
pub fn archive_together<P: AsRef<Path>>(
    folders: &[P],
    target: &Path,
    tarball_name: &str,
) -> Result<PathBuf> {
    let archive = archive_path(target, tarball_name);
    archive_folders(&archive, folders)?;
    info!(
        folders = folders.len(),
        "Compressed all simulations into '{}'",
        archive.display()
    );
    Ok(archive)
}

/// What a standalone compression pass (`--compress-only`) collects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressScope {
    /// Every `batch_prefix*` directory, one archive each
    Batches { batch_prefix: String },
    /// Every `sim_prefix*` directory, together in one archive
    AllSimulations {
        sim_prefix: String,
        tarball_name: String,
    },
}

/// Compress folders already present under `target`.
///
/// Fails with [`Error::ArchiveTargetNotFound`] when nothing matches.
pub fn compress_existing(target: &Path, scope: &CompressScope) -> Result<Vec<PathBuf>> {
    match scope {
        CompressScope::Batches { batch_prefix } => {
            let batches = find_prefixed_dirs(target, batch_prefix)?;
            if batches.is_empty() {
                return Err(Error::ArchiveTargetNotFound {
                    kind: "batch",
                    prefix: batch_prefix.clone(),
                    dir: target.to_path_buf(),
                });
            }
            archive_each(&batches)
        }
        CompressScope::AllSimulations {
            sim_prefix,
            tarball_name,
        } => {
            let sims = find_simulation_dirs(target, sim_prefix, None)?;
            if sims.is_empty() {
                return Err(Error::ArchiveTargetNotFound {
                    kind: "simulation",
                    prefix: sim_prefix.clone(),
                    dir: target.to_path_buf(),
                });
            }
            Ok(vec![archive_together(&sims, target, tarball_name)?])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use tempfile::tempdir;

    fn member_names(archive: &Path) -> Vec<String> {
        let file = File::open(archive).unwrap();
        let mut tar = tar::Archive::new(GzDecoder::new(file));
        tar.entries()
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                e.path()
                    .unwrap()
                    .to_string_lossy()
                    .trim_end_matches('/')
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_archive_preserves_relative_paths() {
        let dir = tempdir().unwrap();
        let sim = dir.path().join("sim_a");
        fs::create_dir_all(sim.join("out")).unwrap();
        fs::write(sim.join("parameters.txt"), "a 1\n").unwrap();
        fs::write(sim.join("out/log.txt"), "done\n").unwrap();

        let archive = dir.path().join("one.tar.gz");
        archive_folders(&archive, &[&sim]).unwrap();

        assert_eq!(
            member_names(&archive),
            vec!["sim_a", "sim_a/out", "sim_a/out/log.txt", "sim_a/parameters.txt"]
        );
        assert!(sim.join("parameters.txt").is_file());
    }

    #[test]
    fn test_compress_existing_batches() {
        let dir = tempdir().unwrap();
        let target = dir.path();
        fs::create_dir(target.join("batch_1")).unwrap();
        fs::create_dir(target.join("batch_2")).unwrap();
        fs::write(target.join("batch_1/file1.txt"), "1").unwrap();
        fs::write(target.join("batch_2/file2.txt"), "2").unwrap();

        let scope = CompressScope::Batches {
            batch_prefix: "batch_".to_string(),
        };
        let archives = compress_existing(target, &scope).unwrap();

        assert_eq!(
            archives,
            vec![target.join("batch_1.tar.gz"), target.join("batch_2.tar.gz")]
        );
        assert!(member_names(&archives[0]).contains(&"batch_1".to_string()));
        assert!(member_names(&archives[1]).contains(&"batch_2/file2.txt".to_string()));

        // The archives themselves must not be picked up on a second pass.
        let again = compress_existing(target, &scope).unwrap();
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn test_compress_existing_all_simulations() {
        let dir = tempdir().unwrap();
        let target = dir.path();
        fs::create_dir(target.join("sim_folder_1")).unwrap();
        fs::create_dir(target.join("sim_folder_2")).unwrap();
        fs::create_dir(target.join("unrelated")).unwrap();

        let scope = CompressScope::AllSimulations {
            sim_prefix: "sim".to_string(),
            tarball_name: "all_simulations".to_string(),
        };
        let archives = compress_existing(target, &scope).unwrap();

        assert_eq!(archives, vec![target.join("all_simulations.tar.gz")]);
        assert_eq!(
            member_names(&archives[0]),
            vec!["sim_folder_1", "sim_folder_2"]
        );
    }

    #[test]
    fn test_compress_existing_nothing_found() {
        let dir = tempdir().unwrap();

        let batches = compress_existing(
            dir.path(),
            &CompressScope::Batches {
                batch_prefix: "batch_".to_string(),
            },
        );
        assert!(matches!(
            batches,
            Err(Error::ArchiveTargetNotFound { kind: "batch", .. })
        ));

        let sims = compress_existing(
            dir.path(),
            &CompressScope::AllSimulations {
                sim_prefix: "sim".to_string(),
                tarball_name: "all".to_string(),
            },
        );
        assert!(matches!(
            sims,
            Err(Error::ArchiveTargetNotFound { kind: "simulation", .. })
        ));
        assert!(!dir.path().join("all.tar.gz").exists());
    }
}
