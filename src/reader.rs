//! Reading MARC records from binary streams.
//!
//! This module provides [`MarcReader`] for reading ISO 2709 formatted MARC records
//! from any source that implements [`std::io::BufRead`].
//!
//! The stream is split at record terminators before anything is decoded, so a
//! malformed record only spoils its own chunk: the reader returns a recoverable
//! [`MarcError`] for it and the next call starts cleanly at the following record.
//!
//! # Examples
//!
//! ```no_run
//! use marc_audit::MarcReader;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(BufReader::new(file));
//!
//! loop {
//!     match reader.read_record() {
//!         Ok(Some(record)) => println!("Leader: {}", record.leader),
//!         Ok(None) => break,
//!         Err(e) if e.is_recoverable() => eprintln!("skipping record: {e}"),
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::BufRead;

use crate::error::{MarcError, Result};
use crate::leader::{Leader, LEADER_LEN};
use crate::record::{Field, Record};

/// End of a record.
pub const RECORD_TERMINATOR: u8 = 0x1D;
/// End of a field (and of the directory).
pub const FIELD_TERMINATOR: u8 = 0x1E;
/// Introduces a subfield code.
pub const SUBFIELD_DELIMITER: u8 = 0x1F;

const DIRECTORY_ENTRY_LEN: usize = 12;

/// Reader for ISO 2709 binary MARC format.
///
/// `MarcReader` reads one MARC record at a time. Records are fully parsed and
/// returned as [`Record`] instances.
#[derive(Debug)]
pub struct MarcReader<R: BufRead> {
    reader: R,
    records_read: usize,
    failed: bool,
}

impl<R: BufRead> MarcReader<R> {
    /// Create a new MARC reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use marc_audit::MarcReader;
    /// use std::io::Cursor;
    ///
    /// let reader = MarcReader::new(Cursor::new(Vec::new()));
    /// assert_eq!(reader.records_read(), 0);
    /// ```
    pub fn new(reader: R) -> Self {
        MarcReader {
            reader,
            records_read: 0,
            failed: false,
        }
    }

    /// Number of record chunks consumed so far, decodable or not.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Read a single MARC record.
    ///
    /// Returns `Ok(Some(record))` if a record was successfully read, `Ok(None)` if EOF
    /// was reached, or `Err` if the chunk could not be decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The binary data is malformed ([`MarcError::is_recoverable`] is true;
    ///   the reader has already moved past the chunk)
    /// - An I/O error occurs (not recoverable)
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        let mut chunk = Vec::new();
        self.reader.read_until(RECORD_TERMINATOR, &mut chunk)?;

        if chunk.is_empty() {
            return Ok(None);
        }
        if chunk.last() != Some(&RECORD_TERMINATOR) {
            // Trailing newline or padding after the last record
            if chunk.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            self.records_read += 1;
            return Err(MarcError::TruncatedRecord(
                "Unexpected end of file while reading record data".to_string(),
            ));
        }

        self.records_read += 1;
        decode_record(&chunk).map(Some)
    }
}

impl<R: BufRead> Iterator for MarcReader<R> {
    type Item = Result<Record>;

    /// Yields one item per record chunk; stops after an unrecoverable error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.read_record().transpose();
        if let Some(Err(e)) = &item {
            self.failed = !e.is_recoverable();
        }
        item
    }
}

/// Decode one record chunk, terminator included.
///
/// # Errors
///
/// Returns an error if the leader, directory or any field is malformed.
pub fn decode_record(chunk: &[u8]) -> Result<Record> {
    let leader = Leader::from_bytes(chunk)?;
    leader.validate_for_reading()?;

    let base_address = leader.data_base_address()?;
    if base_address > chunk.len() {
        return Err(MarcError::TruncatedRecord(format!(
            "Base address {base_address} is beyond the end of the record ({} bytes)",
            chunk.len()
        )));
    }

    let directory = &chunk[LEADER_LEN..base_address];
    let data = &chunk[base_address..];
    let mut record = Record::new(leader);

    // Directory entries are 12 bytes each: tag(3) + length(4) + start position(5)
    let mut pos = 0;
    while pos < directory.len() {
        if directory[pos] == FIELD_TERMINATOR {
            break;
        }
        if pos + DIRECTORY_ENTRY_LEN > directory.len() {
            return Err(MarcError::InvalidRecord(
                "Incomplete directory entry".to_string(),
            ));
        }

        let entry = &directory[pos..pos + DIRECTORY_ENTRY_LEN];
        let tag = String::from_utf8_lossy(&entry[0..3]).to_string();
        let field_length = parse_digits(&entry[3..7])?;
        let start_position = parse_digits(&entry[7..12])?;
        pos += DIRECTORY_ENTRY_LEN;

        let end_position = start_position + field_length;
        if end_position > data.len() {
            return Err(MarcError::InvalidRecord(format!(
                "Field {tag} exceeds data area"
            )));
        }
        let field_data = strip_terminator(&data[start_position..end_position]);

        if is_control_tag(&tag) {
            let value = String::from_utf8_lossy(field_data).to_string();
            record.add_field(Field::control(tag, value));
        } else {
            let field = parse_data_field(field_data, &tag)
                .map_err(|e| MarcError::InvalidField(format!("Tag {tag}: {e}")))?;
            record.add_field(field);
        }
    }

    Ok(record)
}

/// Control fields are 001-009.
fn is_control_tag(tag: &str) -> bool {
    tag.starts_with("00") && tag.chars().all(|c| c.is_ascii_digit())
}

fn strip_terminator(data: &[u8]) -> &[u8] {
    match data.last() {
        Some(&FIELD_TERMINATOR) => &data[..data.len() - 1],
        _ => data,
    }
}

/// Parse a data field from raw bytes (terminator already removed)
fn parse_data_field(data: &[u8], tag: &str) -> Result<Field> {
    if data.len() < 2 {
        return Err(MarcError::InvalidField(
            "Data field too short (needs indicators)".to_string(),
        ));
    }

    let mut field = Field::new(tag, data[0] as char, data[1] as char);

    let subfield_data = &data[2..];
    let mut current_position = 0;

    while current_position < subfield_data.len() {
        if subfield_data[current_position] != SUBFIELD_DELIMITER {
            return Err(MarcError::InvalidField(
                "Expected subfield delimiter".to_string(),
            ));
        }
        current_position += 1;
        if current_position >= subfield_data.len() {
            break;
        }

        let code = subfield_data[current_position] as char;
        current_position += 1;

        let end = subfield_data[current_position..]
            .iter()
            .position(|&b| b == SUBFIELD_DELIMITER)
            .map_or(subfield_data.len(), |offset| current_position + offset);

        let value = String::from_utf8_lossy(&subfield_data[current_position..end]).to_string();
        field.add_subfield(code, value);
        current_position = end;
    }

    Ok(field)
}

/// Parse a directory number (length or start position) from ASCII digits
fn parse_digits(bytes: &[u8]) -> Result<usize> {
    let mut result = 0usize;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return Err(MarcError::InvalidRecord(format!(
                "Invalid numeric field: expected digits, got byte {}",
                byte as char
            )));
        }
        result = result * 10 + usize::from(byte - b'0');
    }
    Ok(result)
}
