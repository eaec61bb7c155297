//! Controlled-value document parser.
//!
//! The document describes coded positions inside field or subfield values:
//!
//! ```xml
//! <controlValues>
//!   <field tag="000">
//!     <subfield code="@" startPosition="6">
//!       <value value="a" name="Language material"/>
//!       <value value="m"/>
//!     </subfield>
//!   </field>
//! </controlValues>
//! ```
//!
//! Each `subfield` element becomes one [`ControlledValueRule`]. Offsets that
//! are not plain non-negative integers are treated as absent.

use lazy_static::lazy_static;
use quick_xml::de::from_str as xml_from_str;
use regex::Regex;
use serde::Deserialize;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::definitions::ControlledValueRule;

lazy_static! {
    static ref OFFSET: Regex = Regex::new(r"^\d+$").unwrap();
}

/// Root element; its name is not checked.
#[derive(Debug, Deserialize)]
struct ControlValuesDocument {
    #[serde(default, rename = "field")]
    fields: Vec<XmlField>,
}

#[derive(Debug, Deserialize)]
struct XmlField {
    #[serde(rename = "@tag")]
    tag: String,
    #[serde(default, rename = "subfield")]
    subfields: Vec<XmlSubfield>,
}

#[derive(Debug, Deserialize)]
struct XmlSubfield {
    #[serde(rename = "@code")]
    code: String,
    #[serde(default, rename = "@startPosition")]
    start_position: Option<String>,
    #[serde(default, rename = "@endPosition")]
    end_position: Option<String>,
    #[serde(default, rename = "value")]
    values: Vec<XmlValue>,
}

#[derive(Debug, Deserialize)]
struct XmlValue {
    #[serde(rename = "@value")]
    value: String,
    #[serde(default, rename = "@name")]
    name: Option<String>,
}

fn parse_offset(raw: Option<&str>) -> Option<usize> {
    raw.filter(|value| OFFSET.is_match(value))
        .and_then(|value| value.parse().ok())
}

impl XmlSubfield {
    fn into_rule(self, tag: &str) -> SchemaResult<ControlledValueRule> {
        let mut chars = self.code.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(code), None) => code,
            _ => {
                return Err(SchemaError::InvalidControlledValue {
                    tag: tag.to_string(),
                    reason: format!("subfield code must be one character, got '{}'", self.code),
                })
            }
        };

        let mut rule = ControlledValueRule::new(
            tag,
            code,
            parse_offset(self.start_position.as_deref()),
            parse_offset(self.end_position.as_deref()),
        );
        for value in self.values {
            let name = value.name.unwrap_or_else(|| value.value.clone());
            rule.values.insert(value.value, name);
        }
        Ok(rule)
    }
}

/// Parse a controlled-value document into rules, in document order.
///
/// # Errors
///
/// Returns a [`SchemaError`] if the markup is not well-formed, a required
/// attribute is missing, or a subfield code is not a single character.
pub fn parse_controlled_values(xml: &str) -> SchemaResult<Vec<ControlledValueRule>> {
    let document: ControlValuesDocument = xml_from_str(xml)?;

    let mut rules = Vec::new();
    for field in document.fields {
        for subfield in field.subfields {
            rules.push(subfield.into_rule(&field.tag)?);
        }
    }

    tracing::debug!(rules = rules.len(), "controlled values parsed");
    Ok(rules)
}
