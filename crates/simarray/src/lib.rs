//! Simarray
//!
//! Generates batches of simulation folders from pre-expanded parameter
//! tables, writes a per-folder parameter file from a template, and archives
//! or populates those folders later by naming convention.

pub mod archive;
pub mod batch;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod materialize;
pub mod naming;
pub mod table;
pub mod template;

pub use error::{Error, Result};
pub use materialize::{materialize, plan, GenerateOptions, Generation, Plan, PlannedFolder};
pub use naming::NamingScheme;
pub use table::{CombinationRow, ParameterTable};
pub use template::{MissingKeys, ParamSeparator, Template};
