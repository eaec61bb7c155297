#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! ## Library overview
//!
//! An audit has three stages:
//!
//! 1. [`SchemaSources::load`] parses the framework export, the authorized-value
//!    export and the controlled-value document into a [`RuleIndex`]. Any
//!    inconsistency is a [`SchemaError`] and nothing is validated.
//! 2. [`MarcReader`] splits an ISO 2709 stream into records. A chunk that
//!    cannot be decoded is reported and skipped.
//! 3. [`RecordValidator`] checks each [`Record`] against the index and sends
//!    every [`ValidationFinding`] to a [`FindingSink`], such as
//!    [`ReportWriter`].
//!
//! [`audit::run`] chains the three from an [`AuditConfig`].
//!
//! ```
//! use marc_audit::{
//!     parse_authorized_values, parse_controlled_values, parse_framework, ErrorKind, Field,
//!     Leader, Record, RecordValidator, RuleIndex,
//! };
//!
//! let framework = parse_framework(
//!     "\"tagfield\",\"liblibrarian\",\"libopac\",\"repeatable\",\"mandatory\",\"important\",\"authorised_value\"\n\
//!      \"001\",\"Control number\",\"\",\"0\",\"1\",\"0\",\"\"\n\
//!      \"#-#\",\"#-#\",\"#-#\",\"#-#\",\"#-#\",\"#-#\",\"#-#\",\"#-#\",\"#-#\",\"#-#\"\n"
//!         .as_bytes(),
//! )?;
//! let categories =
//!     parse_authorized_values("category;authorised_value;lib;lib_opac\n".as_bytes())?;
//! let rules = parse_controlled_values("<controlValues/>")?;
//! let index = RuleIndex::build(framework, categories, rules)?;
//!
//! let record = Record::new(Leader::from("00000nam a2200000   4500"));
//! let findings = RecordValidator::new(&index).validate_record(0, &record);
//!
//! let kinds: Vec<ErrorKind> = findings.iter().map(|f| f.kind).collect();
//! assert_eq!(kinds, vec![ErrorKind::NoRecordId, ErrorKind::MissingMandatoryField]);
//! # Ok::<(), marc_audit::SchemaError>(())
//! ```
//!
//! ## Modules
//!
//! - [`schema`] — schema sources and their parsers
//! - [`rule_index`] — the compiled, read-only schema
//! - [`positional`] — fixed-position windows over coded values
//! - [`validator`] — the per-record validation pass
//! - [`finding`] — findings and sinks
//! - [`report`] — the semicolon-separated error report
//! - [`reader`] — ISO 2709 record reader
//! - [`record`] / [`leader`] — decoded record model
//! - [`audit`] — the pipeline
//! - [`config`] / [`logging`] — run configuration and log setup
//! - [`error`] — error types and result aliases

pub mod audit;
pub mod config;
pub mod error;
pub mod finding;
pub mod leader;
pub mod logging;
pub mod positional;
pub mod reader;
/// Decoded MARC record structures (`Record`, `Field`, `Subfield`)
pub mod record;
pub mod report;
pub mod rule_index;
pub mod schema;
pub mod validator;

pub use audit::{audit_stream, AuditSummary};
pub use config::AuditConfig;
pub use error::{AuditError, AuditResult, MarcError, Result, SchemaError, SchemaResult};
pub use finding::{ErrorKind, FindingSink, ValidationFinding};
pub use leader::Leader;
pub use reader::MarcReader;
pub use record::{Field, FieldBuilder, FieldContent, Record, Subfield};
pub use report::ReportWriter;
pub use rule_index::RuleIndex;
pub use schema::{
    parse_authorized_values, parse_controlled_values, parse_framework, AuthorizedValue,
    AuthorizedValueCategory, ControlledValueRule, FieldDefinition, Framework, SchemaSources,
    SubfieldDefinition,
};
pub use validator::RecordValidator;
