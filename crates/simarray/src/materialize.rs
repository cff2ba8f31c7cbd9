//! Simulation folder generation.
//!
//! Turns a [`ParameterTable`] into one folder per row and replicate, each
//! holding a parameter file with that row's values:
//!
//! ```text
//! <target>/[<batch-prefix><i>/]<folder-name>/<parameter-file>
//! ```
//!
//! Generation runs in two steps. [`plan`] is pure: it names every folder,
//! assigns batches and rejects name collisions without touching the disk.
//! [`materialize`] then validates the template and dispatch files, refuses
//! to proceed if any planned folder already exists, and only then creates
//! folders in row order, replicate order within a row.
//!
//! Existing simulation folders are never overwritten. A folder that shows up
//! between the pre-flight check and its creation still aborts the run with
//! [`Error::FolderExists`]; nothing already written is cleaned up.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::archive::{archive_each, archive_together};
use crate::batch::partition;
use crate::dispatch::Dispatch;
use crate::error::{Error, Result};
use crate::naming::{is_single_component, NamingScheme};
use crate::table::ParameterTable;
use crate::template::{output_file_name, MissingKeys, ParamSeparator, Template};

/// Everything that shapes a generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Directory receiving the folders (created if absent)
    pub target: PathBuf,
    pub naming: NamingScheme,
    /// Folders per batch container; `None` keeps all folders under `target`
    pub batch_size: Option<NonZeroUsize>,
    pub batch_prefix: String,
    /// Baseline parameter file copied into each folder
    pub template: Option<PathBuf>,
    /// Name of the parameter file inside each folder
    pub output_file: Option<String>,
    pub param_separator: ParamSeparator,
    pub missing_keys: MissingKeys,
    /// Extra files copied into every new folder
    pub dispatch: Vec<PathBuf>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            target: PathBuf::from("."),
            naming: NamingScheme::default(),
            batch_size: None,
            batch_prefix: "batch_".to_string(),
            template: None,
            output_file: None,
            param_separator: ParamSeparator::default(),
            missing_keys: MissingKeys::default(),
            dispatch: Vec::new(),
        }
    }
}

impl GenerateOptions {
    /// File name of the parameter file written into each folder.
    pub fn output_file_name(&self) -> PathBuf {
        output_file_name(self.output_file.as_deref(), self.template.as_deref())
    }
}

/// A folder the generation pass intends to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFolder {
    pub name: String,
    pub path: PathBuf,
    /// 0-based row in the parameter table
    pub row: usize,
    /// 1-based replicate number, when replicates are enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicate: Option<u32>,
    /// 1-based batch number, when batching is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<usize>,
    pub parameters: IndexMap<String, String>,
}

/// The full set of folders and batch containers for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub folders: Vec<PlannedFolder>,
    pub batch_dirs: Vec<PathBuf>,
}

/// Name every folder and assign batches, without touching the filesystem.
///
/// Fails with [`Error::InvalidFolderName`] if a name is not a plain directory
/// entry, and with [`Error::FolderCollision`] if two folders would share a path.
pub fn plan(table: &ParameterTable, options: &GenerateOptions) -> Result<Plan> {
    let naming = &options.naming;
    let replicates = naming.replicate_count();

    let mut entries = Vec::with_capacity(table.row_count() * replicates as usize);
    for (row_index, row) in table.rows().enumerate() {
        let base = naming.base_name(&row);
        let parameters: IndexMap<String, String> = row
            .pairs()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        for replicate in 1..=replicates {
            let name = naming.replicate_name(&base, replicate);
            if !is_single_component(&name) {
                return Err(Error::InvalidFolderName {
                    name,
                    line: row_index + 1,
                });
            }
            entries.push(PlannedFolder {
                name,
                path: PathBuf::new(),
                row: row_index,
                replicate: (replicates > 1).then_some(replicate),
                batch: None,
                parameters: parameters.clone(),
            });
        }
    }

    let mut plan = Plan::default();
    match options.batch_size {
        Some(size) => {
            for batch in partition(entries, size) {
                let dir = options.target.join(batch.name(&options.batch_prefix));
                for mut folder in batch.members {
                    folder.path = dir.join(&folder.name);
                    folder.batch = Some(batch.index);
                    plan.folders.push(folder);
                }
                plan.batch_dirs.push(dir);
            }
        }
        None => {
            for mut folder in entries {
                folder.path = options.target.join(&folder.name);
                plan.folders.push(folder);
            }
        }
    }

    {
        let mut seen = HashSet::new();
        for folder in &plan.folders {
            if !seen.insert(folder.path.as_path()) {
                return Err(Error::FolderCollision(folder.name.clone()));
            }
        }
    }

    Ok(plan)
}

/// Result of a generation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub target: PathBuf,
    /// Prefix the simulation folders were named with
    pub sim_prefix: String,
    /// Created simulation folders, in creation order
    pub folders: Vec<PathBuf>,
    /// Batch containers, empty when batching is off
    pub batch_dirs: Vec<PathBuf>,
}

impl Generation {
    /// Archive what this pass created: one archive per batch container, or
    /// all folders together in `<target>/<tarball_name>.tar.gz`.
    pub fn compress(&self, tarball_name: &str) -> Result<Vec<PathBuf>> {
        if !self.batch_dirs.is_empty() {
            return archive_each(&self.batch_dirs);
        }
        if self.folders.is_empty() {
            return Err(Error::ArchiveTargetNotFound {
                kind: "simulation",
                prefix: self.sim_prefix.clone(),
                dir: self.target.clone(),
            });
        }
        Ok(vec![archive_together(
            &self.folders,
            &self.target,
            tarball_name,
        )?])
    }
}

/// Create every folder of the table, write its parameter file and dispatch
/// extra files into it.
pub fn materialize(table: &ParameterTable, options: &GenerateOptions) -> Result<Generation> {
    let template = match &options.template {
        Some(path) => {
            let template = Template::load(path, options.param_separator.clone())?;
            template.check_keys(table.names())?;
            Some(template)
        }
        None => None,
    };
    let dispatch = Dispatch::new(options.dispatch.clone())?;
    let plan = plan(table, options)?;

    if let Some(existing) = plan.folders.iter().find(|f| f.path.exists()) {
        return Err(Error::FolderExists(existing.path.clone()));
    }

    create_dirs(&options.target)?;
    for dir in &plan.batch_dirs {
        create_dirs(dir)?;
    }

    let file_name = options.output_file_name();
    let mut folders = Vec::with_capacity(plan.folders.len());
    for folder in &plan.folders {
        let row = table.row(folder.row).ok_or_else(|| {
            Error::InvalidConfig(format!("row {} missing from table", folder.row))
        })?;

        fs::create_dir(&folder.path).map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::FolderExists(folder.path.clone()),
            _ => Error::io(&folder.path, e),
        })?;

        let contents = match &template {
            Some(template) => {
                let mut updated = template.clone();
                updated.apply(&row, options.missing_keys);
                updated
            }
            None => Template::from_row(&row, options.param_separator.clone()),
        };
        contents.write_to(&folder.path.join(&file_name))?;

        if !dispatch.is_empty() {
            dispatch.into_folder(&folder.path)?;
        }

        debug!("Created folder: {}", folder.path.display());
        folders.push(folder.path.clone());
    }

    if plan.batch_dirs.is_empty() {
        info!("Total folders created: {}.", folders.len());
    } else {
        info!(
            "Total folders created: {} across {} batches.",
            folders.len(),
            plan.batch_dirs.len()
        );
    }

    Ok(Generation {
        target: options.target.clone(),
        sim_prefix: options.naming.sim_prefix.clone(),
        folders,
        batch_dirs: plan.batch_dirs,
    })
}

fn create_dirs(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}
