//! Error types for DAT archive operations

use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for DAT archive operations
pub type Result<T> = std::result::Result<T, DatError>;

/// Reasons a candidate file cannot be stored in an archive
///
/// These only ever cause the offending file to be skipped; the rest of a
/// pack operation continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name or extension contains characters outside 7-bit ASCII
    #[error("Input file names must be valid ASCII")]
    NonAscii,

    /// Extension is not exactly three characters long
    #[error("Input file names must have 3 character extensions (found {0})")]
    ExtensionLength(usize),

    /// Base name is empty or longer than eight characters
    #[error("Input file names must be 1 to 8 characters in length (found {0})")]
    NameLength(usize),

    /// Base name still contains a dot after the extension was split off
    #[error("Input file names cannot have multiple extensions or additional dots")]
    EmbeddedDot,

    /// File is too large for a 32-bit size field
    #[error("Input file is {0} bytes, larger than a 32-bit size field allows")]
    TooLarge(u64),
}

/// Errors raised while laying out, encoding, decoding or extracting archives
#[derive(Debug, Error)]
pub enum DatError {
    /// Leading magic number is not 12345678
    #[error("Not an archive of the correct format: magic {0} (expected 12345678)")]
    InvalidMagic(u32),

    /// Stream ended before a table could be read completely
    #[error("Truncated archive: {0}")]
    Truncated(String),

    /// A name or extension field holds bytes outside 7-bit ASCII
    #[error("Invalid {field} in archive table: {bytes:02x?}")]
    InvalidIdentifier {
        /// Which field was being decoded ("name" or "extension")
        field: &'static str,
        /// Raw field bytes
        bytes: Vec<u8>,
    },

    /// A table or payload range points past the end of the stream
    #[error("{what} at {start}..{end} lies outside the archive ({len} bytes)")]
    OutOfBounds {
        /// Description of the range that was checked
        what: String,
        /// Range start
        start: u64,
        /// Range end (exclusive)
        end: u64,
        /// Stream length
        len: u64,
    },

    /// Two groups share the same extension
    #[error("Duplicate extension group: {0}")]
    DuplicateExtension(String),

    /// Group or member index does not exist in the archive
    #[error("No member at group {group}, index {member}")]
    MemberNotFound {
        /// Group index
        group: usize,
        /// Member index within the group
        member: usize,
    },

    /// Member name or extension would escape the extraction directory
    #[error("Member {0:?} cannot be extracted safely")]
    UnsafeMemberName(String),

    /// Candidate failed name/extension validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Payload source produced fewer bytes than recorded at layout time
    #[error("Source for {name} ended after {actual} of {expected} bytes")]
    SourceTruncated {
        /// Member file name
        name: String,
        /// Size recorded in the member table
        expected: u32,
        /// Bytes actually copied
        actual: u64,
    },

    /// Payload source holds more bytes than recorded at layout time
    #[error("Source for {name} grew beyond the {expected} bytes recorded when it was planned")]
    SourceSizeChanged {
        /// Member file name
        name: String,
        /// Size recorded in the member table
        expected: u32,
    },

    /// Write cursor does not match a position recorded by the layout
    #[error("Write cursor at {actual} but {what} expects {expected}")]
    LayoutMismatch {
        /// Table or member whose position was checked
        what: String,
        /// Recorded position
        expected: u64,
        /// Actual cursor
        actual: u64,
    },

    /// Laid-out archive does not fit 32-bit offsets
    #[error("Archive would be {0} bytes, beyond the 32-bit offset limit")]
    ArchiveTooLarge(u64),

    /// Every candidate output name already exists
    #[error("Archive output file exists and no alternative: {0}")]
    NoAvailableName(PathBuf),

    /// Binary read/write error
    #[error("Binary format error: {0}")]
    BinRead(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DatError {
    /// Whether this error means the bytes are not a well-formed archive
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic(_)
                | Self::Truncated(_)
                | Self::InvalidIdentifier { .. }
                | Self::OutOfBounds { .. }
                | Self::DuplicateExtension(_)
                | Self::UnsafeMemberName(_)
                | Self::BinRead(_)
        )
    }

    /// Whether this error came from the underlying reader, writer or source
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::SourceTruncated { .. } | Self::SourceSizeChanged { .. }
        )
    }
}

impl From<binrw::Error> for DatError {
    fn from(e: binrw::Error) -> Self {
        match e {
            binrw::Error::Io(io) if io.kind() == ErrorKind::UnexpectedEof => {
                Self::Truncated(io.to_string())
            }
            binrw::Error::Io(io) => Self::Io(io),
            other => Self::BinRead(other.to_string()),
        }
    }
}
