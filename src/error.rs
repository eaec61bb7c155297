//! Error types for schema loading, record decoding and auditing.
//!
//! Errors fall into two tiers:
//!
//! - [`SchemaError`] — a framework, authorized-value or controlled-value source
//!   could not be compiled. Always fatal: nothing is validated against a
//!   partially built schema.
//! - [`MarcError`] — a single record chunk could not be decoded. Fatal for that
//!   record only; the audit reports it as `CHUNK_ERROR` and moves on.
//!
//! [`AuditError`] wraps both, plus I/O failures at the stream boundaries, for
//! the top-level pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for decoding a single MARC record.
///
/// Represents various error conditions that can occur while splitting and
/// parsing an ISO 2709 record chunk.
#[derive(Error, Debug)]
pub enum MarcError {
    /// Error indicating an invalid or malformed MARC record.
    #[error("Invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Error indicating an invalid leader (24-byte header).
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// Error indicating an invalid field structure.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Error indicating a truncated or incomplete record.
    #[error("Truncated record: {0}")]
    TruncatedRecord(String),

    /// IO error from the underlying source.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MarcError {
    /// Whether the reader can continue with the next record after this error.
    ///
    /// Only I/O failures leave the stream in an unknown position.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MarcError::IoError(_))
    }
}

/// Fatal error raised while compiling the schema sources.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A schema file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The tabular reader rejected the input.
    #[error("{source_name}: CSV error: {source}")]
    Csv {
        /// Name of the schema source.
        source_name: String,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },

    /// A framework or authorized-value row has the wrong shape.
    #[error("{source_name} line {line}: malformed row: {reason}")]
    MalformedRow {
        /// Name of the schema source.
        source_name: String,
        /// 1-based line number of the row.
        line: u64,
        /// What is wrong with the row.
        reason: String,
    },

    /// A subfield row refers to a tag with no field row before it.
    #[error("{source_name} line {line}: subfield {tag}${code} refers to an unregistered field")]
    UnregisteredTag {
        /// Name of the schema source.
        source_name: String,
        /// 1-based line number of the row.
        line: u64,
        /// Field tag of the row.
        tag: String,
        /// Subfield code of the row.
        code: char,
    },

    /// A subfield definition names an authorized-value category that does not exist.
    #[error("subfield {tag}${code} uses unknown authorized value category '{category}'")]
    UnknownAuthorizedCategory {
        /// Field tag.
        tag: String,
        /// Subfield code.
        code: char,
        /// Missing category id.
        category: String,
    },

    /// The controlled-value document is not well-formed or has the wrong shape.
    #[error("controlled values: XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// A controlled-value `subfield` element is unusable.
    #[error("controlled values: field {tag}: {reason}")]
    InvalidControlledValue {
        /// Field tag of the enclosing `field` element.
        tag: String,
        /// What is wrong with the element.
        reason: String,
    },
}

/// Top-level error of an audit run.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The schema could not be compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The record stream failed in a way the reader cannot skip past.
    #[error("record stream: {0}")]
    Stream(#[source] MarcError),

    /// An input or output file could not be opened.
    #[error("cannot open {path}: {source}")]
    Open {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A finding could not be written to the report.
    #[error("error report: {0}")]
    Report(#[from] csv::Error),

    /// Other I/O failure at the report boundary.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuditError {
    /// Whether this failure comes from the schema sources.
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(self, AuditError::Schema(_))
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;

/// Result of schema loading.
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Result of an audit run.
pub type AuditResult<T> = std::result::Result<T, AuditError>;
