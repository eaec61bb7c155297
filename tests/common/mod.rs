//! Common test helpers shared across the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use marc_audit::{RuleIndex, SchemaSources};

const FIELD_TERMINATOR: u8 = 0x1E;
const RECORD_TERMINATOR: u8 = 0x1D;
const SUBFIELD_DELIMITER: u8 = 0x1F;

/// One field of a record to encode.
pub enum FieldSpec<'a> {
    /// Control field: tag and raw data
    Control(&'a str, &'a str),
    /// Data field: tag, two indicators and `(code, value)` pairs
    Data(&'a str, &'a str, &'a [(char, &'a str)]),
}

/// Encode an ISO 2709 record.
///
/// The leader has `n` status, `type_of_record` at position 6 and `m`
/// (monograph) at position 7.
pub fn encode_record(type_of_record: char, fields: &[FieldSpec<'_>]) -> Vec<u8> {
    let mut directory = Vec::new();
    let mut data = Vec::new();

    for spec in fields {
        let (tag, mut body) = match spec {
            FieldSpec::Control(tag, value) => (*tag, value.as_bytes().to_vec()),
            FieldSpec::Data(tag, indicators, subfields) => {
                let mut body = indicators.as_bytes().to_vec();
                for (code, value) in *subfields {
                    body.push(SUBFIELD_DELIMITER);
                    body.extend_from_slice(code.to_string().as_bytes());
                    body.extend_from_slice(value.as_bytes());
                }
                (*tag, body)
            }
        };
        body.push(FIELD_TERMINATOR);
        directory.extend_from_slice(tag.as_bytes());
        directory.extend_from_slice(format!("{:04}{:05}", body.len(), data.len()).as_bytes());
        data.extend_from_slice(&body);
    }
    directory.push(FIELD_TERMINATOR);

    let base_address = 24 + directory.len();
    let record_length = base_address + data.len() + 1;

    let leader = format!("{record_length:05}n{type_of_record}m a22{base_address:05}   4500");
    let mut bytes = leader.into_bytes();
    bytes.extend_from_slice(&directory);
    bytes.extend_from_slice(&data);
    bytes.push(RECORD_TERMINATOR);
    bytes
}

/// A chunk that ends like a record but cannot be decoded.
pub fn garbage_chunk() -> Vec<u8> {
    let mut bytes = b"this is not an ISO 2709 record at all".to_vec();
    bytes.push(RECORD_TERMINATOR);
    bytes
}

/// 40-character 008 with `language` at positions 35-37.
pub fn fixed_length_data(language: &str) -> String {
    format!("{:<35}{language} d", "240101s2024    fr")
}

/// Path of a file under `tests/data`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// The schema files under `tests/data`.
pub fn schema_sources() -> SchemaSources {
    SchemaSources {
        framework: fixture("framework.csv"),
        authorized_values: fixture("authorised_values.csv"),
        controlled_values: fixture("controlled_values.xml"),
    }
}

/// The compiled fixture schema.
pub fn rule_index() -> RuleIndex {
    schema_sources().load().expect("fixture schema loads")
}
