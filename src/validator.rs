//! The per-record validation pass.
//!
//! [`RecordValidator`] borrows a [`RuleIndex`] and checks one decoded record
//! at a time. All checks run to completion; a failing check never stops the
//! others. Findings go to a [`FindingSink`] in discovery order:
//!
//! 1. record identifier (001, else 035$a)
//! 2. mandatory fields
//! 3. non-repeatable fields
//! 4. mandatory subfields
//! 5. leader content (as tag `000`, code `@`)
//! 6. every field in record order: mapping, control content, subfield
//!    mapping and repetition, then the content of every subfield
//!
//! Content analysis covers empty and blank values, authorized-value
//! membership and every controlled-value window declared for the
//! tag and code.
//!
//! # Examples
//!
//! ```
//! use marc_audit::{
//!     ErrorKind, Field, FieldDefinition, Framework, Leader, Record, RecordValidator, RuleIndex,
//! };
//! use std::collections::HashMap;
//!
//! let mut framework = Framework::default();
//! framework.add_field(FieldDefinition::new("001", "Control number"));
//! let index = RuleIndex::build(framework, HashMap::new(), Vec::new())?;
//!
//! let mut record = Record::new(Leader::from("00000nam a2200000   4500"));
//! record.add_field(Field::control("001", "rec-1"));
//! record.add_field(Field::builder("999", ' ', ' ').subfield('a', "local").build());
//!
//! let findings = RecordValidator::new(&index).validate_record(0, &record);
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].kind, ErrorKind::UnmappedField);
//! assert_eq!(findings[0].id, "rec-1");
//! # Ok::<(), marc_audit::SchemaError>(())
//! ```

use std::fmt::Display;

use crate::error::{AuditResult, MarcError};
use crate::finding::{ErrorKind, FindingSink, ValidationFinding};
use crate::positional;
use crate::record::{Field, FieldContent, Record};
use crate::rule_index::RuleIndex;
use crate::schema::definitions::{CONTROL_CODE, LEADER_TAG};

/// Applies a [`RuleIndex`] to decoded records.
#[derive(Debug, Clone, Copy)]
pub struct RecordValidator<'a> {
    index: &'a RuleIndex,
}

impl<'a> RecordValidator<'a> {
    /// Create a validator over a compiled schema.
    #[must_use]
    pub fn new(index: &'a RuleIndex) -> Self {
        RecordValidator { index }
    }

    /// Validate one record, sending every finding to `sink`.
    ///
    /// Returns the number of findings emitted.
    ///
    /// # Errors
    ///
    /// Only sink failures are returned; record problems are findings.
    pub fn validate<S: FindingSink + ?Sized>(
        &self,
        record_index: usize,
        record: &Record,
        sink: &mut S,
    ) -> AuditResult<usize> {
        let mut pass = Pass {
            index: self.index,
            record_index,
            id: String::new(),
            emitted: 0,
            sink,
        };
        pass.resolve_id(record)?;
        pass.check_mandatory_fields(record)?;
        pass.check_non_repeatable_fields(record)?;
        pass.check_mandatory_subfields(record)?;
        pass.analyse_content(LEADER_TAG, CONTROL_CODE, record.leader.as_str(), &record.leader)?;
        for field in record.fields() {
            pass.check_field(field)?;
        }

        tracing::debug!(record_index, id = %pass.id, findings = pass.emitted, "record validated");
        Ok(pass.emitted)
    }

    /// Validate one record into a fresh list of findings.
    ///
    /// # Panics
    ///
    /// Never: a `Vec` sink accepts every finding.
    #[must_use]
    pub fn validate_record(&self, record_index: usize, record: &Record) -> Vec<ValidationFinding> {
        let mut findings = Vec::new();
        match self.validate(record_index, record, &mut findings) {
            Ok(_) => findings,
            Err(error) => unreachable!("Vec sink rejected a finding: {error}"),
        }
    }
}

/// Report a record chunk that could not be decoded.
///
/// No other check runs for such a record; its identifier is unknown.
///
/// # Errors
///
/// Returns an error if the sink fails.
pub fn report_chunk_error<S: FindingSink + ?Sized>(
    record_index: usize,
    error: &MarcError,
    sink: &mut S,
) -> AuditResult<()> {
    sink.emit(ValidationFinding::new(
        record_index,
        "",
        ErrorKind::ChunkError,
        error.to_string(),
        "",
    ))
}

/// State of the validation of one record.
struct Pass<'i, 's, S: FindingSink + ?Sized> {
    index: &'i RuleIndex,
    record_index: usize,
    id: String,
    emitted: usize,
    sink: &'s mut S,
}

impl<S: FindingSink + ?Sized> Pass<'_, '_, S> {
    fn emit(&mut self, kind: ErrorKind, context: String, data: String) -> AuditResult<()> {
        self.emitted += 1;
        self.sink.emit(ValidationFinding {
            index: self.record_index,
            id: self.id.clone(),
            kind,
            context,
            data,
        })
    }

    fn resolve_id(&mut self, record: &Record) -> AuditResult<()> {
        if let Some(id) = record.control_field("001").filter(|id| !id.is_empty()) {
            self.id = id.to_string();
            return Ok(());
        }
        match record.get_field("035") {
            None => self.emit(ErrorKind::NoRecordId, "No 001 or 035".to_string(), String::new()),
            Some(field) => match field.get_subfield('a').filter(|id| !id.is_empty()) {
                Some(id) => {
                    self.id = id.to_string();
                    Ok(())
                }
                None => self.emit(
                    ErrorKind::NoRecordId,
                    "No 001 or 035$a".to_string(),
                    String::new(),
                ),
            },
        }
    }

    fn check_mandatory_fields(&mut self, record: &Record) -> AuditResult<()> {
        let index = self.index;
        for definition in index.mandatory_fields() {
            if definition.tag == LEADER_TAG {
                continue;
            }
            if record.count(&definition.tag) == 0 {
                self.emit(ErrorKind::MissingMandatoryField, definition.tag.clone(), String::new())?;
            }
        }
        Ok(())
    }

    fn check_non_repeatable_fields(&mut self, record: &Record) -> AuditResult<()> {
        let index = self.index;
        for definition in index.non_repeatable_fields() {
            let count = record.count(&definition.tag);
            if count > 1 {
                let data = record
                    .fields_by_tag(&definition.tag)
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" | ");
                self.emit(
                    ErrorKind::NonRepeatableField,
                    format!("{} (nb: {count})", definition.tag),
                    data,
                )?;
            }
        }
        Ok(())
    }

    fn check_mandatory_subfields(&mut self, record: &Record) -> AuditResult<()> {
        let index = self.index;
        for definition in index.mandatory_subfields() {
            let mut occurrences = record.fields_by_tag(&definition.tag).peekable();
            if occurrences.peek().is_none() {
                self.emit(
                    ErrorKind::MissingFieldWithMandatorySubfield,
                    format!("{} for ${}", definition.tag, definition.code),
                    String::new(),
                )?;
                continue;
            }
            for field in occurrences {
                let present = match &field.content {
                    FieldContent::Control(_) => definition.code == CONTROL_CODE,
                    FieldContent::Data { .. } => field.has_subfield(definition.code),
                };
                if !present {
                    self.emit(
                        ErrorKind::MissingMandatorySubfield,
                        format!("{} ${}", definition.tag, definition.code),
                        field.to_string(),
                    )?;
                }
            }
        }
        Ok(())
    }

    fn check_field(&mut self, field: &Field) -> AuditResult<()> {
        let index = self.index;
        let Some(definition) = index.field_by_tag(&field.tag) else {
            return self.emit(ErrorKind::UnmappedField, field.tag.clone(), field.to_string());
        };

        if let FieldContent::Control(data) = &field.content {
            return self.analyse_content(&field.tag, CONTROL_CODE, data, field);
        }

        if field.subfields().is_empty() {
            self.emit(ErrorKind::DatafieldWithoutSubfield, field.tag.clone(), field.to_string())?;
        }

        for (code, values) in field.subfields_by_code() {
            match definition.subfield(code) {
                None => {
                    self.emit(
                        ErrorKind::UnmappedSubfield,
                        format!("{} ${code}", field.tag),
                        field.to_string(),
                    )?;
                }
                Some(subfield) if !subfield.repeatable && values.len() > 1 => {
                    self.emit(
                        ErrorKind::NonRepeatableSubfield,
                        format!("{} ${code}", field.tag),
                        field.to_string(),
                    )?;
                }
                Some(_) => {}
            }
        }

        for subfield in field.subfields() {
            self.analyse_content(&field.tag, subfield.code, &subfield.value, field)?;
        }
        Ok(())
    }

    /// Content checks shared by the leader, control fields and subfields.
    ///
    /// `owner` is rendered as the data of empty and blank findings.
    fn analyse_content(
        &mut self,
        tag: &str,
        code: char,
        value: &str,
        owner: &dyn Display,
    ) -> AuditResult<()> {
        let index = self.index;
        // Unmapped codes are reported by the field check
        let Some(definition) = index.subfield_by_tag_code(tag, code) else {
            return Ok(());
        };

        if value.is_empty() {
            self.emit(ErrorKind::EmptySubfield, format!("{tag} ${code}"), owner.to_string())?;
        } else if value.chars().all(char::is_whitespace) {
            self.emit(
                ErrorKind::SubfieldContentIsOnlyWhitespace,
                format!("{tag} ${code}"),
                owner.to_string(),
            )?;
        }

        if let Some(category_id) = &definition.authorized_value {
            let permitted = index
                .authorized_category(category_id)
                .is_some_and(|category| category.is_valid_value(value));
            if !permitted {
                self.emit(
                    ErrorKind::IllegalAuthorizedValue,
                    format!("{tag} ${code} ({category_id})"),
                    value.to_string(),
                )?;
            }
        }

        for rule in index.controlled_rules_for(tag, code) {
            let window = positional::extract(value, rule);
            if !rule.is_valid_value(&window) {
                let context = format!("{tag} ${code} {}", positional::describe_window(rule));
                self.emit(
                    ErrorKind::IllegalControledValue,
                    context.trim_end().to_string(),
                    window,
                )?;
            }
        }
        Ok(())
    }
}
