//! Table-of-contents entries: extension groups and their members

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::Result;
use crate::header::{GroupDescriptor, MemberDescriptor};
use crate::ident::{pad_ascii, trim_ascii};

/// One archived file
///
/// `offset` is absolute within the archive. Names decoded from an archive are
/// kept as-is (trailing NULs trimmed) and are not required to satisfy the
/// packing rules.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MemberEntry {
    /// Base name without extension
    pub name: String,
    /// Payload size in bytes
    pub size: u32,
    /// Absolute payload offset
    pub offset: u32,
}

impl MemberEntry {
    /// Create a new member entry
    pub fn new(name: impl Into<String>, size: u32, offset: u32) -> Self {
        Self {
            name: name.into(),
            size,
            offset,
        }
    }

    /// Output file name, `<name>.<extension>` in lowercase
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.name, extension).to_lowercase()
    }

    /// Byte offset just past this member's payload
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }

    pub(crate) fn from_descriptor(descriptor: &MemberDescriptor) -> Result<Self> {
        Ok(Self {
            name: trim_ascii(&descriptor.name, "name")?,
            size: descriptor.size,
            offset: descriptor.offset,
        })
    }

    pub(crate) fn descriptor(&self) -> MemberDescriptor {
        MemberDescriptor {
            name: pad_ascii(&self.name),
            size: self.size,
            offset: self.offset,
        }
    }
}

/// All members sharing one extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionGroup {
    /// Extension without leading dot
    pub extension: String,
    /// Absolute offset of this group's member table
    pub table_pos: u32,
    /// Members in table order
    pub members: Vec<MemberEntry>,
}

impl ExtensionGroup {
    /// Create a group; `count` is always derived from `members`
    pub fn new(extension: impl Into<String>, table_pos: u32, members: Vec<MemberEntry>) -> Self {
        Self {
            extension: extension.into(),
            table_pos,
            members,
        }
    }

    /// Member count as stored in the group descriptor
    pub fn count(&self) -> u32 {
        self.members.len() as u32
    }

    /// Sum of member payload sizes
    pub fn payload_size(&self) -> u64 {
        self.members.iter().map(|m| u64::from(m.size)).sum()
    }

    pub(crate) fn descriptor(&self) -> GroupDescriptor {
        GroupDescriptor {
            extension: pad_ascii(&self.extension),
            table_pos: self.table_pos,
            member_count: self.count(),
        }
    }
}

// Emits `count` next to the members, as stored in the group descriptor
impl Serialize for ExtensionGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ExtensionGroup", 4)?;
        state.serialize_field("extension", &self.extension)?;
        state.serialize_field("table_pos", &self.table_pos)?;
        state.serialize_field("count", &self.count())?;
        state.serialize_field("members", &self.members)?;
        state.end()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_member_file_name() {
        let member = MemberEntry::new("MAP01", 10, 80);
        assert_eq!(member.file_name("BMP"), "map01.bmp");
        assert_eq!(member.end(), 90);
    }

    #[test]
    fn test_member_descriptor_round_trip() {
        let member = MemberEntry::new("abcdefgh", 1234, 5678);
        let descriptor = member.descriptor();
        assert_eq!(&descriptor.name, b"abcdefgh");

        let decoded = MemberEntry::from_descriptor(&descriptor).unwrap();
        assert_eq!(decoded, member);
    }

    #[test]
    fn test_group_descriptor() {
        let group = ExtensionGroup::new(
            "txt",
            32,
            vec![MemberEntry::new("a", 10, 80), MemberEntry::new("b", 20, 90)],
        );
        let descriptor = group.descriptor();
        assert_eq!(&descriptor.extension, b"txt\0");
        assert_eq!(descriptor.table_pos, 32);
        assert_eq!(descriptor.member_count, 2);
        assert_eq!(group.payload_size(), 30);
    }

    #[test]
    fn test_group_serializes_count() {
        let group = ExtensionGroup::new(
            "txt",
            32,
            vec![MemberEntry::new("a", 10, 80), MemberEntry::new("b", 20, 90)],
        );
        let value = serde_json::to_value(&group).unwrap();
        assert_eq!(value["extension"], "txt");
        assert_eq!(value["table_pos"], 32);
        assert_eq!(value["count"], 2);
        assert_eq!(value["members"][1]["offset"], 90);
    }
}
