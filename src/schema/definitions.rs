//! Typed schema definitions produced by the schema parsers.

use std::collections::HashMap;

use indexmap::IndexMap;

/// Code used for the whole value of a control field or of the leader.
pub const CONTROL_CODE: char = '@';

/// Pseudo-tag under which the leader is described in a framework.
pub const LEADER_TAG: &str = "000";

/// Definition of a field (one framework field row plus its subfield rows).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDefinition {
    /// Field tag (3 characters)
    pub tag: String,
    /// Staff-interface label
    pub label: String,
    /// The field may occur more than once in a record
    pub repeatable: bool,
    /// The field must occur at least once in a record
    pub mandatory: bool,
    /// Authorized-value category of the field, if any (informational)
    pub authorized_value: Option<String>,
    /// Subfields by code, in declaration order
    pub subfields: IndexMap<char, SubfieldDefinition>,
}

impl FieldDefinition {
    /// Create a field definition with no subfields.
    #[must_use]
    pub fn new(tag: impl Into<String>, label: impl Into<String>) -> Self {
        FieldDefinition {
            tag: tag.into(),
            label: label.into(),
            repeatable: true,
            mandatory: false,
            authorized_value: None,
            subfields: IndexMap::new(),
        }
    }

    /// Control fields carry raw data rather than coded subfields.
    ///
    /// True when the tag is numeric and below 10 (this includes the leader
    /// pseudo-tag `000`).
    #[must_use]
    pub fn is_control_field(&self) -> bool {
        self.tag.parse::<u16>().is_ok_and(|n| n < 10)
    }

    /// Register a subfield. A later row for the same code replaces the earlier one.
    pub fn add_subfield(&mut self, subfield: SubfieldDefinition) {
        self.subfields.insert(subfield.code, subfield);
    }

    /// Subfield definition for a code.
    #[must_use]
    pub fn subfield(&self, code: char) -> Option<&SubfieldDefinition> {
        self.subfields.get(&code)
    }

    /// Whether a code is registered under this field.
    #[must_use]
    pub fn is_code_valid(&self, code: char) -> bool {
        self.subfields.contains_key(&code)
    }

    /// Subfields that may occur at most once per field occurrence.
    pub fn non_repeatable_subfields(&self) -> impl Iterator<Item = &SubfieldDefinition> {
        self.subfields.values().filter(|sf| !sf.repeatable)
    }
}

/// Definition of a subfield, owned by its [`FieldDefinition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubfieldDefinition {
    /// Owning field tag
    pub tag: String,
    /// Subfield code
    pub code: char,
    /// Staff-interface label
    pub label: String,
    /// The code may occur more than once within one field occurrence
    pub repeatable: bool,
    /// The code must occur in every occurrence of the owning field
    pub mandatory: bool,
    /// Excluded from mandatory enforcement even when `mandatory` is set
    pub ignored: bool,
    /// Authorized-value category governing the content, if any
    pub authorized_value: Option<String>,
    /// Cataloguing plugin attached to the subfield, if any
    pub value_builder: Option<String>,
    /// Maximum content length (informational, not enforced)
    pub max_length: Option<usize>,
}

impl SubfieldDefinition {
    /// Create a repeatable, optional subfield definition.
    #[must_use]
    pub fn new(tag: impl Into<String>, code: char) -> Self {
        SubfieldDefinition {
            tag: tag.into(),
            code,
            label: String::new(),
            repeatable: true,
            mandatory: false,
            ignored: false,
            authorized_value: None,
            value_builder: None,
            max_length: None,
        }
    }

    /// Whether content must belong to an authorized-value category.
    #[must_use]
    pub fn uses_authorized_values(&self) -> bool {
        self.authorized_value.is_some()
    }

    /// Mandatory and not excluded from enforcement.
    #[must_use]
    pub fn is_enforced_mandatory(&self) -> bool {
        self.mandatory && !self.ignored
    }
}

/// One row of the authorized-value table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedValue {
    /// Category id
    pub category: String,
    /// Permitted literal value
    pub value: String,
    /// Staff-interface label
    pub label: String,
    /// Public catalogue label
    pub opac_label: String,
}

/// A governed vocabulary: the permitted values of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizedValueCategory {
    /// Category id
    pub id: String,
    values: Vec<String>,
    entries: HashMap<String, AuthorizedValue>,
}

impl AuthorizedValueCategory {
    /// Create an empty category.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        AuthorizedValueCategory {
            id: id.into(),
            values: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Append a value to the category.
    pub fn add_value(&mut self, value: AuthorizedValue) {
        self.values.push(value.value.clone());
        self.entries.insert(value.value.clone(), value);
    }

    /// Exact-match membership test.
    #[must_use]
    pub fn is_valid_value(&self, value: &str) -> bool {
        self.entries.contains_key(value)
    }

    /// Metadata of a permitted value.
    #[must_use]
    pub fn entry(&self, value: &str) -> Option<&AuthorizedValue> {
        self.entries.get(value)
    }

    /// Permitted values in table order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A coded vocabulary over a fixed character window of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlledValueRule {
    /// Owning field tag
    pub tag: String,
    /// Subfield code ([`CONTROL_CODE`] for control fields and the leader)
    pub code: char,
    /// First character of the window (0-based); `None` means the whole value
    pub start: Option<usize>,
    /// Last character of the window (inclusive); `None` means a one-character window
    pub end: Option<usize>,
    /// Permitted codes mapped to their display names
    pub values: IndexMap<String, String>,
}

impl ControlledValueRule {
    /// Create a rule with no permitted values.
    #[must_use]
    pub fn new(
        tag: impl Into<String>,
        code: char,
        start: Option<usize>,
        end: Option<usize>,
    ) -> Self {
        ControlledValueRule {
            tag: tag.into(),
            code,
            start,
            end,
            values: IndexMap::new(),
        }
    }

    /// Add a permitted code.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>, name: impl Into<String>) -> Self {
        self.values.insert(value.into(), name.into());
        self
    }

    /// Whether an extracted window is a permitted code.
    #[must_use]
    pub fn is_valid_value(&self, value: &str) -> bool {
        self.values.contains_key(value)
    }

    /// Whether the rule governs this field/subfield pair.
    #[must_use]
    pub fn applies_to(&self, tag: &str, code: char) -> bool {
        self.tag == tag && self.code == code
    }
}
