//! MARC framework table parser.
//!
//! The framework export is a quoted, comma-separated table in two sections:
//! field rows (one per tag), a sentinel row whose first ten cells are all
//! `#-#`, then subfield rows (one per tag and code). Each section may start
//! with its own header row.
//!
//! Only a handful of columns matter; their positions are fixed by the export
//! format and spelled out in [`FieldRow`] and [`SubfieldRow`].

use std::io::Read;

use csv::StringRecord;
use indexmap::IndexMap;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::definitions::{FieldDefinition, SubfieldDefinition};

const SOURCE: &str = "framework";
const SECTION_SENTINEL: &str = "#-#";
const SENTINEL_WIDTH: usize = 10;
const IGNORED_TAB: &str = "-1";

/// Parsed framework: field definitions plus subfield declaration order.
#[derive(Debug, Clone, Default)]
pub struct Framework {
    /// Field definitions by tag, in declaration order
    pub fields: IndexMap<String, FieldDefinition>,
    /// `(tag, code)` of every subfield row, in declaration order
    pub subfield_order: Vec<(String, char)>,
}

impl Framework {
    /// Register a complete field definition, subfields included.
    ///
    /// Returns `false` (and changes nothing) if the tag is already registered.
    pub fn add_field(&mut self, definition: FieldDefinition) -> bool {
        if self.fields.contains_key(&definition.tag) {
            return false;
        }
        self.subfield_order.extend(
            definition
                .subfields
                .keys()
                .map(|code| (definition.tag.clone(), *code)),
        );
        self.fields.insert(definition.tag.clone(), definition);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Fields,
    Subfields,
}

/// Significant columns of a field row.
///
/// | column | content |
/// |---|---|
/// | 0 | tag |
/// | 1 | staff label |
/// | 3 | repeatable (`0`/`1`) |
/// | 4 | mandatory (`0`/`1`) |
/// | 6 | authorized-value category |
#[derive(Debug)]
struct FieldRow {
    tag: String,
    label: String,
    repeatable: bool,
    mandatory: bool,
    authorized_value: Option<String>,
}

impl FieldRow {
    const WIDTH: usize = 7;

    fn parse(row: &StringRecord, line: u64) -> SchemaResult<Self> {
        let cells = Cells::new(row, line, Self::WIDTH)?;
        Ok(FieldRow {
            tag: cells.text(0),
            label: cells.text(1),
            repeatable: cells.flag(3)?,
            mandatory: cells.flag(4)?,
            authorized_value: cells.optional(6),
        })
    }

    fn into_definition(self) -> FieldDefinition {
        FieldDefinition {
            tag: self.tag,
            label: self.label,
            repeatable: self.repeatable,
            mandatory: self.mandatory,
            authorized_value: self.authorized_value,
            subfields: IndexMap::new(),
        }
    }
}

/// Significant columns of a subfield row.
///
/// | column | content |
/// |---|---|
/// | 0 | tag |
/// | 1 | code |
/// | 2 | staff label |
/// | 4 | repeatable (`0`/`1`) |
/// | 5 | mandatory (`0`/`1`) |
/// | 8 | tab (`-1` marks the subfield as ignored) |
/// | 9 | authorized-value category |
/// | 11 | value builder |
/// | 18 | max length |
#[derive(Debug)]
struct SubfieldRow {
    definition: SubfieldDefinition,
}

impl SubfieldRow {
    const WIDTH: usize = 19;

    fn parse(row: &StringRecord, line: u64) -> SchemaResult<Self> {
        let cells = Cells::new(row, line, Self::WIDTH)?;
        let raw_code = cells.text(1);
        let mut chars = raw_code.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(code), None) => code,
            _ => {
                return Err(cells.malformed(format!(
                    "subfield code must be one character, got '{raw_code}'"
                )))
            }
        };

        Ok(SubfieldRow {
            definition: SubfieldDefinition {
                tag: cells.text(0),
                code,
                label: cells.text(2),
                repeatable: cells.flag(4)?,
                mandatory: cells.flag(5)?,
                ignored: cells.get(8) == IGNORED_TAB,
                authorized_value: cells.optional(9),
                value_builder: cells.optional(11),
                max_length: cells.number(18)?,
            },
        })
    }
}

/// Column access over one row with line-aware errors.
struct Cells<'a> {
    row: &'a StringRecord,
    line: u64,
}

impl<'a> Cells<'a> {
    fn new(row: &'a StringRecord, line: u64, width: usize) -> SchemaResult<Self> {
        let cells = Cells { row, line };
        if row.len() < width {
            return Err(cells.malformed(format!(
                "expected at least {width} columns, got {}",
                row.len()
            )));
        }
        Ok(cells)
    }

    fn get(&self, index: usize) -> &'a str {
        self.row.get(index).unwrap_or_default()
    }

    fn text(&self, index: usize) -> String {
        self.get(index).to_string()
    }

    fn optional(&self, index: usize) -> Option<String> {
        Some(self.get(index).trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn flag(&self, index: usize) -> SchemaResult<bool> {
        let raw = self.get(index).trim();
        raw.parse::<i64>()
            .map(|value| value != 0)
            .map_err(|_| self.malformed(format!("column {index}: expected 0 or 1, got '{raw}'")))
    }

    fn number(&self, index: usize) -> SchemaResult<Option<usize>> {
        let raw = self.get(index).trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<usize>()
            .map(Some)
            .map_err(|_| self.malformed(format!("column {index}: expected a number, got '{raw}'")))
    }

    fn malformed(&self, reason: String) -> SchemaError {
        SchemaError::MalformedRow {
            source_name: SOURCE.to_string(),
            line: self.line,
            reason,
        }
    }
}

fn is_section_sentinel(row: &StringRecord) -> bool {
    row.len() >= SENTINEL_WIDTH && row.iter().take(SENTINEL_WIDTH).all(|c| c == SECTION_SENTINEL)
}

fn is_header(row: &StringRecord) -> bool {
    let cells: Vec<&str> = row.iter().collect();
    cells.contains(&"tagfield")
        && cells
            .windows(3)
            .any(|w| w == ["repeatable", "mandatory", "important"])
}

/// Parse a framework export.
///
/// # Errors
///
/// Returns a [`SchemaError`] if the table cannot be read, a data row is
/// malformed, or a subfield row refers to a tag with no field row.
pub fn parse_framework<R: Read>(input: R) -> SchemaResult<Framework> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut framework = Framework::default();
    let mut section = Section::Fields;

    for result in reader.records() {
        let row = result.map_err(|source| SchemaError::Csv {
            source_name: SOURCE.to_string(),
            source,
        })?;
        let line = row.position().map_or(0, csv::Position::line);

        if is_section_sentinel(&row) {
            section = Section::Subfields;
            continue;
        }
        if row.len() < 2 || is_header(&row) {
            continue;
        }

        match section {
            Section::Fields => {
                let definition = FieldRow::parse(&row, line)?.into_definition();
                let tag = definition.tag.clone();
                if !framework.add_field(definition) {
                    tracing::warn!(%tag, line, "duplicate field row ignored");
                }
            }
            Section::Subfields => {
                let definition = SubfieldRow::parse(&row, line)?.definition;
                let Some(field) = framework.fields.get_mut(&definition.tag) else {
                    return Err(SchemaError::UnregisteredTag {
                        source_name: SOURCE.to_string(),
                        line,
                        tag: definition.tag,
                        code: definition.code,
                    });
                };
                if !field.is_code_valid(definition.code) {
                    framework
                        .subfield_order
                        .push((definition.tag.clone(), definition.code));
                }
                field.add_subfield(definition);
            }
        }
    }

    tracing::debug!(
        fields = framework.fields.len(),
        subfields = framework.subfield_order.len(),
        "framework parsed"
    );
    Ok(framework)
}
