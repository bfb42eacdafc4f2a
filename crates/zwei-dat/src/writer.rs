//! Archive encoding
//!
//! Writes the header, every group descriptor, every member table, then every
//! payload, in that order. The writer tracks its own cursor and checks it
//! against each recorded table position and payload offset, so a
//! [`DatArchive`] that was not produced by the canonical layout is refused
//! instead of producing a corrupt file.
//!
//! # Example
//!
//! ```rust,no_run
//! use zwei_dat::{ArchivePlan, Candidate, DatWriter};
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (mut plan, rejections) = ArchivePlan::from_candidates([
//!     Candidate::from_bytes("intro.txt", b"hello".to_vec()),
//!     Candidate::from_bytes("logo.bmp", vec![0u8; 64]),
//! ]);
//! assert!(rejections.is_empty());
//!
//! let archive = plan.layout()?;
//! let mut writer = DatWriter::new(Cursor::new(Vec::new()));
//! writer.encode(&archive, &mut plan)?;
//! let bytes = writer.into_inner().into_inner();
//! # let _ = bytes;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::Path;

use binrw::BinWrite;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::archive::DatArchive;
use crate::entry::MemberEntry;
use crate::error::{DatError, Result};
use crate::header::{DatHeader, GROUP_DESCRIPTOR_SIZE, HEADER_SIZE, MEMBER_DESCRIPTOR_SIZE};
use crate::plan::ArchivePlan;

/// Supplies member payload bytes while an archive is encoded
///
/// `group` and `member` are indices into [`DatArchive::groups`] and the
/// group's members.
pub trait PayloadSource {
    /// Open the payload of one member for reading
    fn open(
        &mut self,
        group: usize,
        member: usize,
        entry: &MemberEntry,
    ) -> io::Result<Box<dyn Read + '_>>;
}

/// Sequential archive encoder
pub struct DatWriter<W: Write + Seek> {
    writer: W,
    position: u64,
}

impl<W: Write + Seek> DatWriter<W> {
    /// Create a writer positioned at the start of `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
        }
    }

    /// Current write cursor
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Encode `archive`, pulling payloads from `source`
    ///
    /// Returns the number of bytes written.
    pub fn encode<S: PayloadSource + ?Sized>(
        &mut self,
        archive: &DatArchive,
        source: &mut S,
    ) -> Result<u64> {
        archive.validate()?;

        DatHeader::new(archive.groups.len() as u32).write(&mut self.writer)?;
        self.position += HEADER_SIZE;

        for group in &archive.groups {
            group.descriptor().write(&mut self.writer)?;
            self.position += GROUP_DESCRIPTOR_SIZE;
        }

        for group in &archive.groups {
            self.expect_position(&format!("member table of .{}", group.extension), group.table_pos)?;
            for member in &group.members {
                member.descriptor().write(&mut self.writer)?;
                self.position += MEMBER_DESCRIPTOR_SIZE;
            }
        }

        for (g, group) in archive.groups.iter().enumerate() {
            for (m, member) in group.members.iter().enumerate() {
                let file_name = member.file_name(&group.extension);
                self.expect_position(&file_name, member.offset)?;

                let mut payload = source.open(g, m, member)?.take(u64::from(member.size));
                let copied = io::copy(&mut payload, &mut self.writer)?;
                if copied != u64::from(member.size) {
                    return Err(DatError::SourceTruncated {
                        name: file_name,
                        expected: member.size,
                        actual: copied,
                    });
                }
                let mut extra = [0u8; 1];
                if payload.get_mut().read(&mut extra)? > 0 {
                    return Err(DatError::SourceSizeChanged {
                        name: file_name,
                        expected: member.size,
                    });
                }
                self.position += copied;
                debug!("Wrote {} ({} bytes) at {}", file_name, copied, member.offset);
            }
        }

        self.writer.flush()?;
        Ok(self.position)
    }

    fn expect_position(&self, what: &str, expected: u32) -> Result<()> {
        if self.position != u64::from(expected) {
            return Err(DatError::LayoutMismatch {
                what: what.to_string(),
                expected: u64::from(expected),
                actual: self.position,
            });
        }
        Ok(())
    }

    /// Release the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Lay out `plan` and write it to a new file at `output`
///
/// The archive is written to a temporary file next to `output` and only
/// moved into place once encoding has fully succeeded. An existing file at
/// `output` is never replaced.
pub fn write_archive(plan: &mut ArchivePlan, output: &Path) -> Result<DatArchive> {
    let archive = plan.layout()?;

    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    let written = {
        let mut writer = DatWriter::new(BufWriter::new(temp.as_file_mut()));
        writer.encode(&archive, plan)?
    };
    temp.as_file().sync_all()?;
    temp.persist_noclobber(output).map_err(|e| DatError::Io(e.error))?;

    info!(
        "Wrote {} members in {} groups to {:?} ({} bytes)",
        archive.member_count(),
        archive.groups.len(),
        output,
        written
    );
    Ok(archive)
}
