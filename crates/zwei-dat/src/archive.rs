//! In-memory table-of-contents of a DAT archive

use std::collections::HashSet;
use std::io::{Cursor, Read, Seek};

use serde::Serialize;

use crate::entry::{ExtensionGroup, MemberEntry};
use crate::error::{DatError, Result};
use crate::header::{DAT_MAGIC, GROUP_DESCRIPTOR_SIZE, HEADER_SIZE, MEMBER_DESCRIPTOR_SIZE};
use crate::ident::{Extension, MemberName};
use crate::reader::{Decoder, read_payload, stream_len};

/// Complete table-of-contents of a DAT archive
///
/// Built either by [`ArchivePlan::layout`](crate::ArchivePlan::layout) when
/// packing, or by parsing an existing archive. Table positions and offsets
/// are absolute byte positions in the archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatArchive {
    /// Extension groups in table order
    pub groups: Vec<ExtensionGroup>,
}

impl DatArchive {
    /// Create an archive from already laid-out groups
    pub fn new(groups: Vec<ExtensionGroup>) -> Self {
        Self { groups }
    }

    /// Format magic written in the header
    pub fn magic(&self) -> u32 {
        DAT_MAGIC
    }

    /// Parse the table-of-contents from a complete archive buffer
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::read_from(&mut Cursor::new(data))
    }

    /// Parse the table-of-contents from a seekable stream
    ///
    /// Every member table is read from its stored position, so archives whose
    /// tables are not contiguous with the group table decode correctly.
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        Decoder::new(reader)?.run()
    }

    /// Check invariants required before encoding
    ///
    /// Extensions must be unique and every name and extension must satisfy
    /// the packing rules.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.groups.len());
        for group in &self.groups {
            Extension::new(&group.extension)?;
            if !seen.insert(group.extension.as_str()) {
                return Err(DatError::DuplicateExtension(group.extension.clone()));
            }
            for member in &group.members {
                MemberName::new(&member.name)?;
            }
        }
        Ok(())
    }

    /// Total number of members across all groups
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }

    /// Size of header plus group and member tables
    pub fn table_size(&self) -> u64 {
        HEADER_SIZE
            + self.groups.len() as u64 * GROUP_DESCRIPTOR_SIZE
            + self.member_count() as u64 * MEMBER_DESCRIPTOR_SIZE
    }

    /// Largest byte position covered by any table or payload
    pub fn payload_end(&self) -> u64 {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter().map(MemberEntry::end))
            .fold(self.table_size(), u64::max)
    }

    /// Iterate over `(group, member)` pairs in table order
    pub fn entries(&self) -> impl Iterator<Item = (&ExtensionGroup, &MemberEntry)> {
        self.groups
            .iter()
            .flat_map(|g| g.members.iter().map(move |m| (g, m)))
    }

    /// Find a member by its `<name>.<extension>` file name (case-insensitive)
    pub fn find(&self, file_name: &str) -> Option<(&ExtensionGroup, &MemberEntry)> {
        let wanted = file_name.to_lowercase();
        self.entries()
            .find(|(g, m)| m.file_name(&g.extension) == wanted)
    }

    /// Look up a member by group and member index
    pub fn member(&self, group: usize, member: usize) -> Result<&MemberEntry> {
        self.groups
            .get(group)
            .and_then(|g| g.members.get(member))
            .ok_or(DatError::MemberNotFound { group, member })
    }

    /// Read one member's payload from the archive stream
    pub fn extract_member<R: Read + Seek>(
        &self,
        reader: &mut R,
        group: usize,
        member: usize,
    ) -> Result<Vec<u8>> {
        let entry = self.member(group, member)?;
        let len = stream_len(reader)?;
        read_payload(reader, entry, &self.groups[group].extension, len)
    }
}
