//! Schema sources and their parsers.
//!
//! A schema is made of three files exported from the library system:
//!
//! - [`framework`] — field and subfield definitions
//! - [`authorized_values`] — governed vocabularies
//! - [`controlled_values`] — positional codes inside control fields and subfields
//!
//! [`SchemaSources::load`] reads all three and compiles them into a
//! [`RuleIndex`]. Any failure is fatal: there is no partially loaded schema.

pub mod authorized_values;
pub mod controlled_values;
pub mod definitions;
pub mod framework;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub use authorized_values::parse_authorized_values;
pub use controlled_values::parse_controlled_values;
pub use definitions::{
    AuthorizedValue, AuthorizedValueCategory, ControlledValueRule, FieldDefinition,
    SubfieldDefinition, CONTROL_CODE, LEADER_TAG,
};
pub use framework::{parse_framework, Framework};

use crate::error::{SchemaError, SchemaResult};
use crate::rule_index::RuleIndex;

/// Locations of the three schema files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSources {
    /// Framework export (fields, then subfields)
    pub framework: PathBuf,
    /// Authorized-value export
    pub authorized_values: PathBuf,
    /// Controlled-value XML document
    pub controlled_values: PathBuf,
}

impl SchemaSources {
    /// Read, parse and compile all three sources.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if any file cannot be read or parsed, or if
    /// the sources are inconsistent with each other.
    pub fn load(&self) -> SchemaResult<RuleIndex> {
        let categories = parse_authorized_values(open(&self.authorized_values)?)?;
        let framework = parse_framework(open(&self.framework)?)?;
        let xml = fs::read_to_string(&self.controlled_values).map_err(|source| SchemaError::Io {
            path: self.controlled_values.clone(),
            source,
        })?;
        let rules = parse_controlled_values(&xml)?;

        let index = RuleIndex::build(framework, categories, rules)?;
        tracing::info!(
            fields = index.field_count(),
            categories = index.category_count(),
            controlled_rules = index.controlled_rules().len(),
            "schema loaded"
        );
        Ok(index)
    }
}

fn open(path: &Path) -> SchemaResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })
}
