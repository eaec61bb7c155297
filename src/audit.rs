//! The audit pipeline: schema, record loop, report.
//!
//! [`run`] does everything from a configuration; [`audit_stream`] is the
//! record loop alone, over any reader and sink.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};

use crate::config::AuditConfig;
use crate::error::{AuditError, AuditResult};
use crate::finding::{ErrorKind, FindingSink, ValidationFinding};
use crate::reader::MarcReader;
use crate::report::ReportWriter;
use crate::rule_index::RuleIndex;
use crate::validator::{report_chunk_error, RecordValidator};

/// Outcome of a completed audit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditSummary {
    /// Record chunks consumed, decodable or not
    pub records: usize,
    /// Chunks reported as `CHUNK_ERROR`
    pub undecodable: usize,
    /// Findings per kind
    pub by_kind: BTreeMap<ErrorKind, usize>,
}

impl AuditSummary {
    /// Total number of findings.
    #[must_use]
    pub fn findings(&self) -> usize {
        self.by_kind.values().sum()
    }

    /// Number of findings of one kind.
    #[must_use]
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Sink adapter that tallies findings by kind on their way through.
struct Tally<'a, S: FindingSink + ?Sized> {
    inner: &'a mut S,
    by_kind: BTreeMap<ErrorKind, usize>,
}

impl<S: FindingSink + ?Sized> FindingSink for Tally<'_, S> {
    fn emit(&mut self, finding: ValidationFinding) -> AuditResult<()> {
        *self.by_kind.entry(finding.kind).or_insert(0) += 1;
        self.inner.emit(finding)
    }
}

/// Validate every record of a stream, in order.
///
/// Undecodable chunks are reported as `CHUNK_ERROR` and skipped.
///
/// # Errors
///
/// Returns [`AuditError::Stream`] if the stream fails in a way the reader
/// cannot skip past, or the sink's error if a finding cannot be written.
pub fn audit_stream<R, S>(
    reader: MarcReader<R>,
    index: &RuleIndex,
    sink: &mut S,
) -> AuditResult<AuditSummary>
where
    R: BufRead,
    S: FindingSink + ?Sized,
{
    let validator = RecordValidator::new(index);
    let mut tally = Tally {
        inner: sink,
        by_kind: BTreeMap::new(),
    };
    let mut summary = AuditSummary::default();

    for (record_index, item) in reader.enumerate() {
        summary.records += 1;
        match item {
            Ok(record) => {
                validator.validate(record_index, &record, &mut tally)?;
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!(record_index, error = %e, "undecodable record chunk");
                summary.undecodable += 1;
                report_chunk_error(record_index, &e, &mut tally)?;
            }
            Err(e) => return Err(AuditError::Stream(e)),
        }
    }

    summary.by_kind = tally.by_kind;
    Ok(summary)
}

/// Load the schema, audit the record file and write the report.
///
/// The schema is loaded before either data file is opened, so a schema
/// failure leaves no report behind.
///
/// # Errors
///
/// Returns [`AuditError::Schema`] for schema failures and other variants for
/// unreadable input, unwritable report or a broken record stream.
pub fn run(config: &AuditConfig) -> AuditResult<AuditSummary> {
    let index = config.schema.load()?;

    let records = File::open(&config.records).map_err(|source| AuditError::Open {
        path: config.records.clone(),
        source,
    })?;
    let report = File::create(&config.errors).map_err(|source| AuditError::Open {
        path: config.errors.clone(),
        source,
    })?;

    let reader = MarcReader::new(BufReader::new(records));
    let mut report = ReportWriter::new(BufWriter::new(report))?;
    let summary = audit_stream(reader, &index, &mut report)?;
    report.flush()?;

    tracing::info!(
        records = summary.records,
        undecodable = summary.undecodable,
        findings = summary.findings(),
        report = %config.errors.display(),
        "audit complete"
    );
    for (kind, count) in &summary.by_kind {
        tracing::info!(kind = %kind, count, "findings");
    }
    Ok(summary)
}
