//! Run configuration: where the inputs are and where the report goes.
//!
//! The command-line front end fills an [`AuditConfig`] from its arguments,
//! falling back to the environment variables below (a `.env` file in the
//! working directory is honoured).

use std::path::PathBuf;

use crate::schema::SchemaSources;

/// Variable holding the path of the ISO 2709 record file.
pub const RECORDS_VAR: &str = "RECORDS_FILE";
/// Variable holding the path of the error report to create.
pub const ERRORS_VAR: &str = "ERRORS_FILE";
/// Variable holding the path of the framework export.
pub const FRAMEWORK_VAR: &str = "KOHA_MARC_FRAMEWORK_FILE";
/// Variable holding the path of the authorized-value export.
pub const AUTHORIZED_VALUES_VAR: &str = "KOHA_AUTH_VAL_FILE";
/// Variable holding the path of the controlled-value document.
pub const CONTROLLED_VALUES_VAR: &str = "CONTROL_VALUES_FILE";

/// Everything an audit run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// ISO 2709 record stream
    pub records: PathBuf,
    /// Error report, created or truncated
    pub errors: PathBuf,
    /// Schema files
    pub schema: SchemaSources,
}
