//! Archive decoding and member extraction

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use binrw::BinRead;
use tracing::{debug, trace};

use crate::archive::DatArchive;
use crate::entry::{ExtensionGroup, MemberEntry};
use crate::error::{DatError, Result};
use crate::header::{DAT_MAGIC, DatHeader, GroupDescriptor, HEADER_SIZE, MemberDescriptor};
use crate::ident::trim_ascii;

const MAGIC_SIZE: u64 = 4;

/// Progress of a table-of-contents decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecodeState {
    /// Nothing read yet
    Start,
    /// Header read and magic checked
    HeaderRead {
        /// Declared number of groups
        group_count: u32,
    },
    /// All group descriptors read
    GroupTableRead,
    /// Member tables read for this many groups
    MemberTablesRead(usize),
    /// Table-of-contents complete
    Ready,
    /// Decode aborted
    Failed,
}

/// Single-pass table-of-contents decoder
///
/// Walks `Start -> HeaderRead -> GroupTableRead -> MemberTablesRead(n) -> Ready`.
/// Any error moves it to `Failed` and aborts the decode.
pub(crate) struct Decoder<'r, R> {
    reader: &'r mut R,
    len: u64,
    state: DecodeState,
}

impl<'r, R: Read + Seek> Decoder<'r, R> {
    pub(crate) fn new(reader: &'r mut R) -> Result<Self> {
        let len = stream_len(reader)?;
        Ok(Self {
            reader,
            len,
            state: DecodeState::Start,
        })
    }

    pub(crate) fn run(mut self) -> Result<DatArchive> {
        match self.decode() {
            Ok(archive) => Ok(archive),
            Err(e) => {
                debug!("Decode failed after {:?}: {}", self.state, e);
                self.transition(DecodeState::Failed);
                Err(e)
            }
        }
    }

    fn transition(&mut self, next: DecodeState) {
        trace!("Decode state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn decode(&mut self) -> Result<DatArchive> {
        let header = self.read_header()?;
        let descriptors = self.read_group_table(&header)?;

        let mut groups = Vec::with_capacity(descriptors.len());
        for (i, descriptor) in descriptors.iter().enumerate() {
            groups.push(self.read_member_table(descriptor)?);
            self.transition(DecodeState::MemberTablesRead(i + 1));
        }

        self.transition(DecodeState::Ready);
        Ok(DatArchive::new(groups))
    }

    fn read_header(&mut self) -> Result<DatHeader> {
        // Magic first: a short non-archive is InvalidMagic, not Truncated
        self.ensure_range("magic", 0, MAGIC_SIZE)?;
        self.reader.seek(SeekFrom::Start(0))?;
        let magic = u32::read_le(&mut *self.reader)?;
        if magic != DAT_MAGIC {
            return Err(DatError::InvalidMagic(magic));
        }

        self.ensure_range("header", 0, HEADER_SIZE)?;
        let header = DatHeader {
            magic,
            group_count: u32::read_le(&mut *self.reader)?,
        };

        self.transition(DecodeState::HeaderRead {
            group_count: header.group_count,
        });
        Ok(header)
    }

    fn read_group_table(&mut self, header: &DatHeader) -> Result<Vec<GroupDescriptor>> {
        self.ensure_range("group table", HEADER_SIZE, header.group_table_end())?;

        let mut descriptors = Vec::with_capacity(header.group_count as usize);
        for _ in 0..header.group_count {
            descriptors.push(GroupDescriptor::read(&mut *self.reader)?);
        }

        debug!("Read {} group descriptors", descriptors.len());
        self.transition(DecodeState::GroupTableRead);
        Ok(descriptors)
    }

    fn read_member_table(&mut self, descriptor: &GroupDescriptor) -> Result<ExtensionGroup> {
        let extension = trim_ascii(&descriptor.extension, "extension")?;
        self.ensure_range(
            &format!("member table of .{extension}"),
            u64::from(descriptor.table_pos),
            descriptor.table_end(),
        )?;
        self.reader
            .seek(SeekFrom::Start(u64::from(descriptor.table_pos)))?;

        let mut members = Vec::with_capacity(descriptor.member_count as usize);
        for _ in 0..descriptor.member_count {
            let raw = MemberDescriptor::read(&mut *self.reader)?;
            members.push(MemberEntry::from_descriptor(&raw)?);
        }

        debug!(
            "Read {} members of .{} at {}",
            members.len(),
            extension,
            descriptor.table_pos
        );
        Ok(ExtensionGroup::new(extension, descriptor.table_pos, members))
    }

    fn ensure_range(&self, what: &str, start: u64, end: u64) -> Result<()> {
        if end > self.len {
            return Err(DatError::Truncated(format!(
                "{what} needs bytes {start}..{end}, archive has {}",
                self.len
            )));
        }
        Ok(())
    }
}

/// Length of a seekable stream; leaves the cursor at the start
pub(crate) fn stream_len<R: Seek>(reader: &mut R) -> Result<u64> {
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(len)
}

/// Read exactly one member's payload, bounds-checked against `len`
pub(crate) fn read_payload<R: Read + Seek>(
    reader: &mut R,
    member: &MemberEntry,
    extension: &str,
    len: u64,
) -> Result<Vec<u8>> {
    if member.end() > len {
        return Err(DatError::OutOfBounds {
            what: format!("payload of {}", member.file_name(extension)),
            start: u64::from(member.offset),
            end: member.end(),
            len,
        });
    }

    reader.seek(SeekFrom::Start(u64::from(member.offset)))?;
    let mut payload = vec![0u8; member.size as usize];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

/// Output file name for a member, refusing names that could leave the
/// extraction directory
pub fn safe_output_name(group: &ExtensionGroup, member: &MemberEntry) -> Result<String> {
    let file_name = member.file_name(&group.extension);
    let unsafe_char = |c: char| c == '/' || c == '\\' || c == '\0' || c == ':';
    if member.name.is_empty()
        || file_name == "."
        || file_name == ".."
        || member.name.contains(unsafe_char)
        || group.extension.contains(unsafe_char)
    {
        return Err(DatError::UnsafeMemberName(file_name));
    }
    Ok(file_name)
}

/// Parsed archive bound to its byte source
///
/// Opening reads and validates the full table-of-contents; payloads are
/// read on demand.
#[derive(Debug)]
pub struct DatReader<R> {
    reader: R,
    len: u64,
    archive: DatArchive,
}

impl<R: Read + Seek> DatReader<R> {
    /// Decode the table-of-contents of `reader`
    pub fn open(mut reader: R) -> Result<Self> {
        let archive = DatArchive::read_from(&mut reader)?;
        let len = stream_len(&mut reader)?;
        Ok(Self {
            reader,
            len,
            archive,
        })
    }

    /// Parsed table-of-contents
    pub fn archive(&self) -> &DatArchive {
        &self.archive
    }

    /// Consume the reader, keeping only the table-of-contents
    pub fn into_archive(self) -> DatArchive {
        self.archive
    }

    /// Length of the underlying stream
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the underlying stream is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read a member's payload by group and member index
    pub fn extract_member(&mut self, group: usize, member: usize) -> Result<Vec<u8>> {
        let entry = self.archive.member(group, member)?;
        read_payload(
            &mut self.reader,
            entry,
            &self.archive.groups[group].extension,
            self.len,
        )
    }

    /// Read a member's payload by file name (`<name>.<ext>`, case-insensitive)
    pub fn extract_by_name(&mut self, file_name: &str) -> Result<Option<Vec<u8>>> {
        let Some((group, member)) = self.archive.find(file_name) else {
            return Ok(None);
        };
        let payload = read_payload(&mut self.reader, member, &group.extension, self.len)?;
        Ok(Some(payload))
    }

    /// Write every member into `dir`, creating it if needed
    ///
    /// Existing files are overwritten. Returns the written paths in table
    /// order.
    pub fn extract_all(&mut self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.archive.member_count());
        self.extract_each(dir, |path| written.push(path.to_path_buf()))?;
        Ok(written)
    }

    /// Like [`extract_all`](Self::extract_all), calling `on_file` with each
    /// output path just before it is written
    pub fn extract_each<F>(&mut self, dir: &Path, mut on_file: F) -> Result<()>
    where
        F: FnMut(&Path),
    {
        fs::create_dir_all(dir)?;

        for group in &self.archive.groups {
            for member in &group.members {
                let out_path = dir.join(safe_output_name(group, member)?);
                on_file(&out_path);

                let payload = read_payload(&mut self.reader, member, &group.extension, self.len)?;
                fs::write(&out_path, &payload)?;
                debug!("Extracted {} bytes to {:?}", payload.len(), out_path);
            }
        }
        Ok(())
    }

    /// Release the underlying stream
    pub fn into_inner(self) -> R {
        self.reader
    }
}
