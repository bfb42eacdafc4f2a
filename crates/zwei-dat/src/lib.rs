//! Reader and writer for Zwei!! DAT archives
//!
#![allow(clippy::cast_possible_truncation)] // Table counts are bounded by the 32-bit format
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! A DAT archive groups member files by their three-character extension.
//! Each group has a descriptor pointing at its own member table, and each
//! member descriptor records a name, a size and the absolute offset of its
//! payload.
//!
//! # Packing
//!
//! Packing is a two-phase pipeline:
//!
//! 1. [`ArchivePlan::from_candidates`] validates candidate files and groups
//!    them by extension, collecting a [`Rejection`] for every file that
//!    cannot be stored.
//! 2. [`ArchivePlan::layout`] assigns table positions and payload offsets,
//!    producing a [`DatArchive`].
//!
//! [`DatWriter::encode`] then serializes the archive, or [`write_archive`]
//! does layout and encoding into a file that only appears once complete.
//!
//! # Unpacking
//!
//! [`DatReader::open`] decodes the table-of-contents from any seekable
//! stream; payloads are read on demand with [`DatReader::extract_member`] or
//! written out with [`DatReader::extract_all`].
//!
//! ```rust,no_run
//! use zwei_dat::{ArchivePlan, Candidate, DatReader, DatWriter};
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (mut plan, _rejections) =
//!     ArchivePlan::from_candidates([Candidate::from_bytes("intro.txt", b"hello".to_vec())]);
//! let archive = plan.layout()?;
//!
//! let mut writer = DatWriter::new(Cursor::new(Vec::new()));
//! writer.encode(&archive, &mut plan)?;
//!
//! let mut reader = DatReader::open(writer.into_inner())?;
//! assert_eq!(reader.extract_member(0, 0)?, b"hello");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod archive;
pub mod candidate;
pub mod entry;
pub mod error;
pub mod header;
pub mod ident;
mod layout;
pub mod plan;
pub mod reader;
pub mod writer;

pub use archive::DatArchive;
pub use candidate::{Candidate, CandidateSource};
pub use entry::{ExtensionGroup, MemberEntry};
pub use error::{DatError, Result, ValidationError};
pub use header::{
    DAT_MAGIC, DatHeader, GROUP_DESCRIPTOR_SIZE, GroupDescriptor, HEADER_SIZE,
    MEMBER_DESCRIPTOR_SIZE, MemberDescriptor,
};
pub use ident::{Extension, MemberName};
pub use plan::{ArchivePlan, PlannedGroup, PlannedMember, Rejection};
pub use reader::{DatReader, safe_output_name};
pub use writer::{DatWriter, PayloadSource, write_archive};

/// Default number of output names tried before giving up
pub const DEFAULT_MAX_NAME_ATTEMPTS: usize = 100;
