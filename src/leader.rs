//! MARC record leader.
//!
//! The MARC leader is a 24-byte fixed-length field at the start of every MARC record.
//! The audit treats it as opaque positional text (validated like a control field
//! under the pseudo-tag `000`), so the leader keeps its raw characters and only
//! decodes the two numeric positions the reader needs.
//!
//! # Structure
//!
//! - Positions 0-4: Record length (5 digits)
//! - Position 5: Record status
//! - Position 6: Record type (a = language material, c = music, etc.)
//! - Position 7: Bibliographic level (m = monograph, s = serial, etc.)
//! - Positions 8-11: Control type, character coding, indicator and subfield code counts
//! - Positions 12-16: Base address of data (5 digits)
//! - Positions 17-19: Encoding level, cataloging form, multipart level
//! - Positions 20-23: Entry map (usually "4500")

use std::fmt;

use crate::error::{MarcError, Result};

/// Length of a MARC leader in bytes.
pub const LEADER_LEN: usize = 24;

/// MARC Leader - 24 bytes at the start of every MARC record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leader {
    raw: String,
}

impl Leader {
    /// Parse a leader from the first 24 bytes of a record.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than 24 bytes are available.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < LEADER_LEN {
            return Err(MarcError::InvalidLeader(format!(
                "Leader must be at least 24 bytes, got {}",
                bytes.len()
            )));
        }

        Ok(Leader {
            raw: String::from_utf8_lossy(&bytes[..LEADER_LEN]).into_owned(),
        })
    }

    /// The leader text exactly as read.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Character at a 0-based leader position.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<char> {
        self.raw.chars().nth(index)
    }

    /// Record length (positions 0-4).
    ///
    /// # Errors
    ///
    /// Returns an error if the positions are not five ASCII digits.
    pub fn record_length(&self) -> Result<usize> {
        parse_digits(self.raw.as_bytes().get(0..5).unwrap_or_default())
    }

    /// Base address of data (positions 12-16).
    ///
    /// # Errors
    ///
    /// Returns an error if the positions are not five ASCII digits.
    pub fn data_base_address(&self) -> Result<usize> {
        parse_digits(self.raw.as_bytes().get(12..17).unwrap_or_default())
    }

    /// Validate that the leader is suitable for binary record reading.
    ///
    /// Checks that the record length and base address are numeric and at
    /// least 24, which is required before performing arithmetic on them
    /// during ISO 2709 parsing.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is malformed or less than 24.
    pub fn validate_for_reading(&self) -> Result<()> {
        let record_length = self.record_length()?;
        if record_length < LEADER_LEN {
            return Err(MarcError::InvalidLeader(format!(
                "Record length must be at least 24, got {record_length}"
            )));
        }
        let base_address = self.data_base_address()?;
        if base_address < LEADER_LEN {
            return Err(MarcError::InvalidLeader(format!(
                "Base address of data must be at least 24, got {base_address}"
            )));
        }
        Ok(())
    }
}

impl From<&str> for Leader {
    fn from(raw: &str) -> Self {
        Leader {
            raw: raw.to_string(),
        }
    }
}

impl fmt::Display for Leader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse 5-digit ASCII number from bytes
fn parse_digits(bytes: &[u8]) -> Result<usize> {
    if bytes.len() != 5 {
        return Err(MarcError::InvalidLeader(format!(
            "Expected 5-digit field, got {} bytes",
            bytes.len()
        )));
    }

    let mut result = 0usize;
    for &byte in bytes {
        if !byte.is_ascii_digit() {
            return Err(MarcError::InvalidLeader(format!(
                "Invalid numeric field: '{}'",
                String::from_utf8_lossy(bytes)
            )));
        }
        result = result * 10 + usize::from(byte - b'0');
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leader_from_bytes() {
        let bytes = b"01234nam a2200289 i 4500extra";
        let leader = Leader::from_bytes(bytes).unwrap();

        assert_eq!(leader.as_str(), "01234nam a2200289 i 4500");
        assert_eq!(leader.record_length().unwrap(), 1234);
        assert_eq!(leader.data_base_address().unwrap(), 289);
        assert_eq!(leader.position(6), Some('a'));
        assert_eq!(leader.position(7), Some('m'));
        assert_eq!(leader.position(24), None);
    }

    #[test]
    fn test_leader_too_short() {
        let bytes = b"0123456789012";
        let result = Leader::from_bytes(bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_leader_non_numeric_length() {
        let leader = Leader::from("0x234nam a2200289 i 4500");
        assert!(leader.record_length().is_err());
        assert!(leader.validate_for_reading().is_err());
    }

    #[test]
    fn test_display_is_raw_text() {
        let leader = Leader::from("00000acd a2200000   4500");
        assert_eq!(leader.to_string(), "00000acd a2200000   4500");
    }

    #[test]
    fn test_validate_for_reading_rejects_small_record_length() {
        // Leader with record_length=00010 (< 24)
        let bytes = b"00010nam a2200025 i 4500";
        let leader = Leader::from_bytes(bytes).unwrap();
        let result = leader.validate_for_reading();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("Record length must be at least 24"),
            "got: {err}"
        );
    }

    #[test]
    fn test_validate_for_reading_rejects_small_base_address() {
        // Leader with valid record_length=00050 but base_address=00010 (< 24)
        let bytes = b"00050nam a2200010 i 4500";
        let leader = Leader::from_bytes(bytes).unwrap();
        let result = leader.validate_for_reading();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(
            err.contains("Base address of data must be at least 24"),
            "got: {err}"
        );
    }
}
