//! Validation findings and the sinks that receive them.

use std::fmt;

use serde::Serialize;

use crate::error::AuditResult;

/// Closed set of problems the audit reports.
///
/// The serialized name (see [`ErrorKind::as_str`]) is what appears in the
/// `error` column of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The record chunk could not be decoded
    ChunkError,
    /// Neither 001 nor 035$a identifies the record
    NoRecordId,
    /// Tag not defined in the framework
    UnmappedField,
    /// Code not defined under the field's tag
    UnmappedSubfield,
    /// A mandatory field does not occur
    MissingMandatoryField,
    /// A field occurrence lacks a mandatory subfield
    MissingMandatorySubfield,
    /// A non-repeatable field occurs more than once
    NonRepeatableField,
    /// A non-repeatable code occurs more than once in one field occurrence
    NonRepeatableSubfield,
    /// Content outside the subfield's authorized-value category
    IllegalAuthorizedValue,
    /// The field owning a mandatory subfield does not occur
    MissingFieldWithMandatorySubfield,
    /// Empty content
    EmptySubfield,
    /// Content made only of whitespace
    SubfieldContentIsOnlyWhitespace,
    /// A positional window holds a code outside its controlled values
    IllegalControledValue,
    /// Data field with no subfield at all
    DatafieldWithoutSubfield,
}

impl ErrorKind {
    /// Every kind, in code order.
    pub const ALL: [ErrorKind; 14] = [
        ErrorKind::ChunkError,
        ErrorKind::NoRecordId,
        ErrorKind::UnmappedField,
        ErrorKind::UnmappedSubfield,
        ErrorKind::MissingMandatoryField,
        ErrorKind::MissingMandatorySubfield,
        ErrorKind::NonRepeatableField,
        ErrorKind::NonRepeatableSubfield,
        ErrorKind::IllegalAuthorizedValue,
        ErrorKind::MissingFieldWithMandatorySubfield,
        ErrorKind::EmptySubfield,
        ErrorKind::SubfieldContentIsOnlyWhitespace,
        ErrorKind::IllegalControledValue,
        ErrorKind::DatafieldWithoutSubfield,
    ];

    /// Symbolic name written to the report.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ChunkError => "CHUNK_ERROR",
            ErrorKind::NoRecordId => "NO_RECORD_ID",
            ErrorKind::UnmappedField => "UNMAPPED_FIELD",
            ErrorKind::UnmappedSubfield => "UNMAPPED_SUBFIELD",
            ErrorKind::MissingMandatoryField => "MISSING_MANDATORY_FIELD",
            ErrorKind::MissingMandatorySubfield => "MISSING_MANDATORY_SUBFIELD",
            ErrorKind::NonRepeatableField => "NON_REPEATABLE_FIELD",
            ErrorKind::NonRepeatableSubfield => "NON_REPEATABLE_SUBFIELD",
            ErrorKind::IllegalAuthorizedValue => "ILLEGAL_AUTHORIZED_VALUE",
            ErrorKind::MissingFieldWithMandatorySubfield => "MISSING_FIELD_WITH_MANDATORY_SUBFIELD",
            ErrorKind::EmptySubfield => "EMPTY_SUBFIELD",
            ErrorKind::SubfieldContentIsOnlyWhitespace => "SUBFIELD_CONTENT_IS_ONLY_WHITESPACE",
            ErrorKind::IllegalControledValue => "ILLEGAL_CONTROLED_VALUE",
            ErrorKind::DatafieldWithoutSubfield => "DATAFIELD_WITHOUT_SUBFIELD",
        }
    }

    /// Numeric code: 0-1 for record-level problems, 100+ for rule violations.
    #[must_use]
    pub fn code(self) -> u16 {
        match self {
            ErrorKind::ChunkError => 0,
            ErrorKind::NoRecordId => 1,
            ErrorKind::UnmappedField => 100,
            ErrorKind::UnmappedSubfield => 101,
            ErrorKind::MissingMandatoryField => 102,
            ErrorKind::MissingMandatorySubfield => 103,
            ErrorKind::NonRepeatableField => 104,
            ErrorKind::NonRepeatableSubfield => 105,
            ErrorKind::IllegalAuthorizedValue => 106,
            ErrorKind::MissingFieldWithMandatorySubfield => 107,
            ErrorKind::EmptySubfield => 108,
            ErrorKind::SubfieldContentIsOnlyWhitespace => 109,
            ErrorKind::IllegalControledValue => 110,
            ErrorKind::DatafieldWithoutSubfield => 111,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem. Serializes to a report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    /// 0-based position of the record in the input stream
    pub index: usize,
    /// Record identifier; empty when it could not be resolved
    pub id: String,
    /// What went wrong
    #[serde(rename = "error")]
    pub kind: ErrorKind,
    /// Short location label, e.g. `245 $a`
    #[serde(rename = "error_message")]
    pub context: String,
    /// Offending text
    pub data: String,
}

impl ValidationFinding {
    /// Create a finding.
    #[must_use]
    pub fn new(
        index: usize,
        id: impl Into<String>,
        kind: ErrorKind,
        context: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        ValidationFinding {
            index,
            id: id.into(),
            kind,
            context: context.into(),
            data: data.into(),
        }
    }
}

/// Append-only destination for findings.
///
/// Sinks receive findings one at a time, in discovery order, and must not
/// reorder or merge them.
pub trait FindingSink {
    /// Record one finding.
    ///
    /// # Errors
    ///
    /// Returns an error if the finding cannot be stored or written.
    fn emit(&mut self, finding: ValidationFinding) -> AuditResult<()>;
}

impl FindingSink for Vec<ValidationFinding> {
    fn emit(&mut self, finding: ValidationFinding) -> AuditResult<()> {
        self.push(finding);
        Ok(())
    }
}

impl<S: FindingSink + ?Sized> FindingSink for &mut S {
    fn emit(&mut self, finding: ValidationFinding) -> AuditResult<()> {
        (**self).emit(finding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_serialized_form() {
        for kind in ErrorKind::ALL {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new());
            writer.serialize(kind).unwrap();
            let bytes = writer.into_inner().unwrap();
            assert_eq!(String::from_utf8(bytes).unwrap().trim_end(), kind.as_str());
        }
    }

    #[test]
    fn test_codes_are_unique_and_ordered() {
        let codes: Vec<u16> = ErrorKind::ALL.iter().map(|k| k.code()).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(codes, sorted);
        assert_eq!(ErrorKind::IllegalControledValue.code(), 110);
    }

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink: Vec<ValidationFinding> = Vec::new();
        sink.emit(ValidationFinding::new(0, "1", ErrorKind::UnmappedField, "999", "=999  \\\\$ax"))
            .unwrap();
        sink.emit(ValidationFinding::new(0, "1", ErrorKind::EmptySubfield, "245 $a", "=245  10$a"))
            .unwrap();
        let kinds: Vec<ErrorKind> = sink.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::UnmappedField, ErrorKind::EmptySubfield]);
    }
}
