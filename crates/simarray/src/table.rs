//! Parameter table loading.
//!
//! Each parameter lives in its own text file: the file name (minus its
//! extension) is the parameter name and every line is the value for one
//! simulation. Reading N such files side by side yields a row-major table
//! with one row per simulation and one column per parameter.
//!
//! # Loading Process
//!
//! 1. Gather the explicit file paths, then the regular files of an optional
//!    input directory (sorted by path for determinism)
//! 2. Read every file, trimming each line into a value string
//! 3. Verify that all files enumerate the same number of values and that no
//!    two files share a parameter name
//! 4. Transpose into a [`ParameterTable`]
//!
//! Combinations are never expanded here: row `i` of the table is simply
//! line `i` of every file.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// One parameter file: its name and the ordered values it enumerates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterFile {
    /// Parameter name (file stem)
    pub name: String,
    /// Where the values were read from
    pub path: PathBuf,
    /// One value string per simulation row
    pub values: Vec<String>,
}

impl ParameterFile {
    /// Read a parameter file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::MissingInput(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let values = content.lines().map(|line| line.trim().to_string()).collect();

        Ok(Self {
            name: parameter_name(path),
            path: path.to_path_buf(),
            values,
        })
    }
}

/// Derive a parameter name from a file path by dropping directories and the
/// last extension (`input/mutation.txt` becomes `mutation`).
pub fn parameter_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Collect the regular files directly inside `dir`, sorted by path.
pub fn collect_parameter_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::MissingInput(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Row-major table of parameter values.
///
/// Column order follows the order the files were supplied in, row order
/// follows line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterTable {
    names: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl ParameterTable {
    /// Load a table from explicit file paths followed by the files found in
    /// an optional input directory.
    pub fn load(files: &[PathBuf], dir: Option<&Path>) -> Result<Self> {
        let mut paths = files.to_vec();
        if let Some(dir) = dir {
            paths.extend(collect_parameter_files(dir)?);
        }

        if paths.is_empty() {
            return Err(Error::NoInputFiles);
        }

        let parameters = paths
            .iter()
            .map(|path| ParameterFile::load(path))
            .collect::<Result<Vec<_>>>()?;

        Self::from_files(parameters)
    }

    /// Build a table from already-loaded parameter files.
    ///
    /// Fails with [`Error::RowCountMismatch`] unless every file holds the
    /// same number of values as the first one.
    pub fn from_files(files: Vec<ParameterFile>) -> Result<Self> {
        let Some(first) = files.first() else {
            return Err(Error::NoInputFiles);
        };

        let expected = first.values.len();
        if let Some(bad) = files.iter().find(|f| f.values.len() != expected) {
            return Err(Error::RowCountMismatch {
                path: bad.path.clone(),
                found: bad.values.len(),
                reference: first.path.clone(),
                expected,
            });
        }

        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        check_unique_names(&names)?;
        let rows = (0..expected)
            .map(|i| files.iter().map(|f| f.values[i].clone()).collect())
            .collect();

        debug!(
            parameters = names.len(),
            rows = expected,
            "Loaded parameter table"
        );

        Ok(Self { names, rows })
    }

    /// Build a table directly from column names and rows.
    ///
    /// Names must be unique and every row must have exactly one value per name.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        check_unique_names(&names)?;
        if let Some(row) = rows.iter().find(|row| row.len() != names.len()) {
            return Err(Error::InvalidConfig(format!(
                "row has {} values but there are {} parameters",
                row.len(),
                names.len()
            )));
        }
        Ok(Self { names, rows })
    }

    /// Parameter names in column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.names.len()
    }

    /// Value at `(row, column)`.
    pub fn get(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// A single combination row.
    pub fn row(&self, index: usize) -> Option<CombinationRow<'_>> {
        self.rows.get(index).map(|values| CombinationRow {
            names: &self.names,
            values,
        })
    }

    /// All combination rows in order.
    pub fn rows(&self) -> impl Iterator<Item = CombinationRow<'_>> {
        self.rows.iter().map(move |values| CombinationRow {
            names: &self.names,
            values,
        })
    }
}

fn check_unique_names(names: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    match names.iter().find(|name| !seen.insert(name.as_str())) {
        Some(name) => Err(Error::InvalidConfig(format!(
            "parameter '{}' is supplied by more than one input file",
            name
        ))),
        None => Ok(()),
    }
}

/// One simulation's aligned `(parameter, value)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinationRow<'a> {
    names: &'a [String],
    values: &'a [String],
}

impl<'a> CombinationRow<'a> {
    /// Iterate over `(name, value)` pairs in column order.
    pub fn pairs(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let (names, values) = (self.names, self.values);
        names
            .iter()
            .map(String::as_str)
            .zip(values.iter().map(String::as_str))
    }

    /// Look up a value by parameter name.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.pairs().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
