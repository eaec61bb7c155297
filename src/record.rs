//! Decoded MARC bibliographic record structures.
//!
//! This module provides the record types the audit consumes:
//! - [`Record`] — leader plus fields in stream order
//! - [`Field`] — a control field (raw data) or a data field (indicators and subfields)
//! - [`Subfield`] — a coded data element within a data field
//!
//! Unlike an editing model, fields are kept in a single ordered list exactly as
//! they appeared in the record, because findings are reported in that order.
//!
//! # Examples
//!
//! ```
//! use marc_audit::{Field, Leader, Record};
//!
//! let mut record = Record::new(Leader::from("00000nam a2200000   4500"));
//! record.add_field(Field::control("001", "12345"));
//! record.add_field(
//!     Field::builder("245", '1', '0')
//!         .subfield('a', "Title")
//!         .build(),
//! );
//!
//! assert_eq!(record.control_field("001"), Some("12345"));
//! assert_eq!(record.count("245"), 1);
//! ```

use std::fmt;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::leader::Leader;

/// A decoded MARC bibliographic record.
#[derive(Debug, Clone)]
pub struct Record {
    /// Record leader (24 bytes)
    pub leader: Leader,
    /// Control and data fields in stream order
    pub fields: Vec<Field>,
}

/// A field in a MARC record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field tag (3 characters)
    pub tag: String,
    /// Field payload
    pub content: FieldContent,
}

/// Payload of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldContent {
    /// Control field (001-009): unstructured data
    Control(String),
    /// Data field (010+): indicators and coded subfields
    Data {
        /// First indicator
        indicator1: char,
        /// Second indicator
        indicator2: char,
        /// Subfields, inline for fields with 4 or fewer
        subfields: SmallVec<[Subfield; 4]>,
    },
}

/// A subfield within a data field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subfield {
    /// Subfield code (single character)
    pub code: char,
    /// Subfield value
    pub value: String,
}

impl Record {
    /// Create a new MARC record with the given leader
    #[must_use]
    pub fn new(leader: Leader) -> Self {
        Record {
            leader,
            fields: Vec::new(),
        }
    }

    /// Append a field, keeping stream order.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Iterate over all fields in stream order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Iterate over fields matching a specific tag
    pub fn fields_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |field| field.tag == tag)
    }

    /// Get first field with a given tag
    #[must_use]
    pub fn get_field(&self, tag: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.tag == tag)
    }

    /// Number of occurrences of a tag.
    #[must_use]
    pub fn count(&self, tag: &str) -> usize {
        self.fields_by_tag(tag).count()
    }

    /// Data of the first control field with a given tag.
    #[must_use]
    pub fn control_field(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .filter(|field| field.tag == tag)
            .find_map(Field::control_data)
    }
}

impl Field {
    /// Create a control field.
    #[must_use]
    pub fn control(tag: impl Into<String>, data: impl Into<String>) -> Self {
        Field {
            tag: tag.into(),
            content: FieldContent::Control(data.into()),
        }
    }

    /// Create a data field with no subfields.
    #[must_use]
    pub fn new(tag: impl Into<String>, indicator1: char, indicator2: char) -> Self {
        Field {
            tag: tag.into(),
            content: FieldContent::Data {
                indicator1,
                indicator2,
                subfields: SmallVec::new(),
            },
        }
    }

    /// Create a builder for constructing data fields fluently
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_audit::Field;
    ///
    /// let field = Field::builder("245", '1', '0')
    ///     .subfield('a', "The Great Gatsby")
    ///     .subfield('c', "F. Scott Fitzgerald")
    ///     .build();
    /// assert_eq!(field.get_subfield('c'), Some("F. Scott Fitzgerald"));
    /// ```
    #[must_use]
    pub fn builder(tag: impl Into<String>, indicator1: char, indicator2: char) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(tag, indicator1, indicator2),
        }
    }

    /// Whether this is a control field.
    #[must_use]
    pub fn is_control_field(&self) -> bool {
        matches!(self.content, FieldContent::Control(_))
    }

    /// Raw data of a control field, `None` for data fields.
    #[must_use]
    pub fn control_data(&self) -> Option<&str> {
        match &self.content {
            FieldContent::Control(data) => Some(data),
            FieldContent::Data { .. } => None,
        }
    }

    /// Add a subfield. Ignored on control fields.
    pub fn add_subfield(&mut self, code: char, value: impl Into<String>) {
        if let FieldContent::Data { subfields, .. } = &mut self.content {
            subfields.push(Subfield {
                code,
                value: value.into(),
            });
        }
    }

    /// All subfields in order; empty for control fields.
    #[must_use]
    pub fn subfields(&self) -> &[Subfield] {
        match &self.content {
            FieldContent::Data { subfields, .. } => subfields,
            FieldContent::Control(_) => &[],
        }
    }

    /// Get first value for a subfield code
    #[must_use]
    pub fn get_subfield(&self, code: char) -> Option<&str> {
        self.subfields()
            .iter()
            .find(|sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// Whether at least one subfield has this code.
    #[must_use]
    pub fn has_subfield(&self, code: char) -> bool {
        self.subfields().iter().any(|sf| sf.code == code)
    }

    /// Subfield values grouped by code, codes in order of first appearance.
    #[must_use]
    pub fn subfields_by_code(&self) -> IndexMap<char, Vec<&str>> {
        let mut groups: IndexMap<char, Vec<&str>> = IndexMap::new();
        for subfield in self.subfields() {
            groups
                .entry(subfield.code)
                .or_default()
                .push(subfield.value.as_str());
        }
        groups
    }
}

/// Mnemonic (MARC breaker) rendering: `=245  10$aTitle$cAuthor`.
///
/// Blank indicators are shown as `\`.
impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "={}  ", self.tag)?;
        match &self.content {
            FieldContent::Control(data) => f.write_str(data),
            FieldContent::Data {
                indicator1,
                indicator2,
                subfields,
            } => {
                for indicator in [indicator1, indicator2] {
                    if *indicator == ' ' {
                        f.write_str("\\")?;
                    } else {
                        write!(f, "{indicator}")?;
                    }
                }
                for subfield in subfields {
                    write!(f, "${}{}", subfield.code, subfield.value)?;
                }
                Ok(())
            }
        }
    }
}

/// Builder for data fields
#[derive(Debug)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Add a subfield
    #[must_use]
    pub fn subfield(mut self, code: char, value: impl Into<String>) -> Self {
        self.field.add_subfield(code, value);
        self
    }

    /// Build the field
    #[must_use]
    pub fn build(self) -> Field {
        self.field
    }
}
