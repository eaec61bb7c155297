//! Semicolon-separated error report.
//!
//! The report is the only artifact of an audit. It has one header row,
//! written when the report is opened, then one row per finding:
//!
//! ```text
//! index;id;error;error_message;data
//! 0;rec-1;UNMAPPED_FIELD;999;=999  \\$alocal
//! ```
//!
//! # Examples
//!
//! ```
//! use marc_audit::{ErrorKind, FindingSink, ReportWriter, ValidationFinding};
//!
//! let mut report = ReportWriter::new(Vec::new())?;
//! report.emit(ValidationFinding::new(0, "rec-1", ErrorKind::UnmappedField, "999", ""))?;
//! let bytes = report.into_inner()?;
//!
//! let text = String::from_utf8(bytes).unwrap();
//! assert_eq!(text, "index;id;error;error_message;data\n0;rec-1;UNMAPPED_FIELD;999;\n");
//! # Ok::<(), marc_audit::AuditError>(())
//! ```

use std::io::Write;

use crate::error::{AuditError, AuditResult};
use crate::finding::{FindingSink, ValidationFinding};

/// Column names, in order.
pub const HEADER: [&str; 5] = ["index", "id", "error", "error_message", "data"];

/// Column delimiter.
pub const DELIMITER: u8 = b';';

/// [`FindingSink`] writing report rows to any [`Write`] destination.
#[derive(Debug)]
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> ReportWriter<W> {
    /// Open a report and write its header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be written.
    pub fn new(destination: W) -> AuditResult<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_writer(destination);
        writer.write_record(HEADER)?;
        Ok(ReportWriter { writer, rows: 0 })
    }

    /// Number of finding rows written, header excluded.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush buffered rows to the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be flushed.
    pub fn flush(&mut self) -> AuditResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn into_inner(self) -> AuditResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| AuditError::Io(e.into_error()))
    }
}

impl<W: Write> FindingSink for ReportWriter<W> {
    fn emit(&mut self, finding: ValidationFinding) -> AuditResult<()> {
        self.writer.serialize(&finding)?;
        self.rows += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::ErrorKind;

    fn lines(report: ReportWriter<Vec<u8>>) -> Vec<String> {
        let bytes = report.into_inner().unwrap();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_header_written_on_open() {
        let report = ReportWriter::new(Vec::new()).unwrap();
        assert_eq!(lines(report), vec!["index;id;error;error_message;data"]);
    }

    #[test]
    fn test_rows_follow_header_in_order() {
        let mut report = ReportWriter::new(Vec::new()).unwrap();
        report
            .emit(ValidationFinding::new(0, "", ErrorKind::NoRecordId, "No 001 or 035", ""))
            .unwrap();
        report
            .emit(ValidationFinding::new(
                0,
                "",
                ErrorKind::IllegalAuthorizedValue,
                "995 $b (LOC)",
                "BASEMENT",
            ))
            .unwrap();
        assert_eq!(report.rows(), 2);
        assert_eq!(
            lines(report),
            vec![
                "index;id;error;error_message;data",
                "0;;NO_RECORD_ID;No 001 or 035;",
                "0;;ILLEGAL_AUTHORIZED_VALUE;995 $b (LOC);BASEMENT",
            ]
        );
    }

    #[test]
    fn test_delimiters_in_data_are_quoted() {
        let mut report = ReportWriter::new(Vec::new()).unwrap();
        let finding =
            ValidationFinding::new(2, "x", ErrorKind::UnmappedField, "999", "=999  \\\\$aa;b");
        report.emit(finding).unwrap();
        let rows = lines(report);
        assert_eq!(rows[1], "2;x;UNMAPPED_FIELD;999;\"=999  \\\\$aa;b\"");

        let text = rows.join("\n");
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .from_reader(text.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[4], "=999  \\\\$aa;b");
    }
}
