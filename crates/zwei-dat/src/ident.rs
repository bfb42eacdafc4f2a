//! Fixed-width ASCII identifiers stored in the archive tables
//!
//! Member names occupy an 8-byte field and extensions a 4-byte field. Both
//! are right-padded with NUL bytes; decoding trims trailing NULs.

use std::fmt;

use serde::Serialize;

use crate::error::{DatError, ValidationError};

/// Maximum length of a member name in bytes
pub const NAME_LEN: usize = 8;

/// Exact length of an extension in bytes
pub const EXTENSION_LEN: usize = 3;

/// On-disk width of the extension field
pub const EXTENSION_FIELD_LEN: usize = 4;

/// Validated member base name (1-8 ASCII bytes, no dot)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MemberName(String);

impl MemberName {
    /// Validate a base name
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        if !name.is_ascii() {
            return Err(ValidationError::NonAscii);
        }
        if name.is_empty() || name.len() > NAME_LEN {
            return Err(ValidationError::NameLength(name.len()));
        }
        if name.contains('.') {
            return Err(ValidationError::EmbeddedDot);
        }
        Ok(Self(name.to_string()))
    }

    /// Name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// NUL-padded 8-byte table field
    pub fn to_field(&self) -> [u8; NAME_LEN] {
        pad_ascii(&self.0)
    }
}

impl fmt::Display for MemberName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated three-character extension, stored without the leading dot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Extension(String);

impl Extension {
    /// Validate an extension (without its leading dot)
    pub fn new(extension: &str) -> Result<Self, ValidationError> {
        if !extension.is_ascii() {
            return Err(ValidationError::NonAscii);
        }
        if extension.len() != EXTENSION_LEN {
            return Err(ValidationError::ExtensionLength(extension.len()));
        }
        Ok(Self(extension.to_string()))
    }

    /// Extension as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// NUL-padded 4-byte table field
    pub fn to_field(&self) -> [u8; EXTENSION_FIELD_LEN] {
        pad_ascii(&self.0)
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Right-pad `value` with NULs into an `N`-byte field, truncating if longer
pub(crate) fn pad_ascii<const N: usize>(value: &str) -> [u8; N] {
    let mut field = [0u8; N];
    let bytes = value.as_bytes();
    let len = bytes.len().min(N);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Decode a NUL-padded ASCII field, trimming trailing NULs
pub(crate) fn trim_ascii(field: &[u8], what: &'static str) -> Result<String, DatError> {
    let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let trimmed = &field[..end];
    if !trimmed.is_ascii() {
        return Err(DatError::InvalidIdentifier {
            field: what,
            bytes: field.to_vec(),
        });
    }
    // ASCII is always valid UTF-8
    Ok(trimmed.iter().map(|&b| char::from(b)).collect())
}
