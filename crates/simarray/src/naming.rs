//! Folder name construction.
//!
//! A simulation folder is named after its parameter values:
//!
//! ```text
//! <sim-prefix><sep><name1><sep><value1><sep><name2><sep><value2>...[<sep><replicate-prefix><k>]
//! ```
//!
//! Whitespace inside a value (vector parameters such as `"1 2 3"`) is
//! replaced by the separator. Values are not escaped: a value that already
//! contains the separator produces an ambiguous name, so the separator must
//! be chosen disjoint from the values.
//!
//! Names are a pure function of the row and the scheme; nothing here looks at
//! the filesystem. A name must still be usable as one directory entry, see
//! [`is_single_component`].

use std::ffi::OsStr;
use std::path::{Component, Path};

use crate::table::CombinationRow;

/// Whether `name` is exactly one plain path component, so joining it onto a
/// directory creates a direct child (no `/`, `.`, `..`, root or empty name).
pub fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) => part == OsStr::new(name),
        _ => false,
    }
}

/// Settings that determine how rows turn into folder names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingScheme {
    /// Placed between every name component
    pub separator: String,
    /// Leading component of every simulation folder
    pub sim_prefix: String,
    /// Folders per combination (0 behaves like 1)
    pub replicates: u32,
    /// Leading text of the replicate component (`r` gives `r1`, `r2`, ...)
    pub replicate_prefix: String,
}

impl Default for NamingScheme {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
            sim_prefix: "sim".to_string(),
            replicates: 1,
            replicate_prefix: "r".to_string(),
        }
    }
}

impl NamingScheme {
    /// Effective number of folders per combination.
    pub fn replicate_count(&self) -> u32 {
        self.replicates.max(1)
    }

    /// Name shared by all replicates of a row.
    pub fn base_name(&self, row: &CombinationRow<'_>) -> String {
        let sep = &self.separator;
        let mut name = self.sim_prefix.clone();
        for (param, value) in row.pairs() {
            name.push_str(sep);
            name.push_str(param);
            name.push_str(sep);
            name.push_str(&value.split_whitespace().collect::<Vec<_>>().join(sep));
        }
        name
    }

    /// Name of a single replicate folder (1-based), or the base name when
    /// the scheme has no replicates.
    pub fn replicate_name(&self, base: &str, replicate: u32) -> String {
        if self.replicate_count() > 1 {
            format!(
                "{}{}{}{}",
                base, self.separator, self.replicate_prefix, replicate
            )
        } else {
            base.to_string()
        }
    }

    /// All folder names for a row, in replicate order.
    pub fn folder_names(&self, row: &CombinationRow<'_>) -> Vec<String> {
        let base = self.base_name(row);
        (1..=self.replicate_count())
            .map(|k| self.replicate_name(&base, k))
            .collect()
    }
}
