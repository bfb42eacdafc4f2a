//! Fixed-size records of the DAT table-of-contents
//!
//! Layout (all integers little-endian u32):
//!
//! ```text
//! offset 0: u32 magic = 12345678
//! offset 4: u32 group_count
//! group_count x GroupDescriptor (12 bytes)
//!   [u8; 4] extension, NUL-padded
//!   u32     table_pos
//!   u32     member_count
//! per group, at table_pos: member_count x MemberDescriptor (16 bytes)
//!   [u8; 8] name, NUL-padded
//!   u32     size
//!   u32     offset
//! ```

use binrw::{BinRead, BinWrite};

use crate::error::{DatError, Result};
use crate::ident::{EXTENSION_FIELD_LEN, NAME_LEN};

/// Magic number at the start of every archive
pub const DAT_MAGIC: u32 = 12_345_678;

/// Size of the archive header in bytes
pub const HEADER_SIZE: u64 = 8;

/// Size of one group descriptor in bytes
pub const GROUP_DESCRIPTOR_SIZE: u64 = 12;

/// Size of one member descriptor in bytes
pub const MEMBER_DESCRIPTOR_SIZE: u64 = 16;

/// Archive header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct DatHeader {
    /// Format magic, must equal [`DAT_MAGIC`]
    pub magic: u32,
    /// Number of group descriptors following the header
    pub group_count: u32,
}

impl DatHeader {
    /// Create a header for `group_count` groups
    pub fn new(group_count: u32) -> Self {
        Self {
            magic: DAT_MAGIC,
            group_count,
        }
    }

    /// Validate header fields
    pub fn validate(&self) -> Result<()> {
        if self.magic != DAT_MAGIC {
            return Err(DatError::InvalidMagic(self.magic));
        }
        Ok(())
    }

    /// Byte offset just past the group descriptor table
    pub fn group_table_end(&self) -> u64 {
        HEADER_SIZE + u64::from(self.group_count) * GROUP_DESCRIPTOR_SIZE
    }
}

/// Group descriptor (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct GroupDescriptor {
    /// NUL-padded extension
    pub extension: [u8; EXTENSION_FIELD_LEN],
    /// Absolute offset of this group's member table
    pub table_pos: u32,
    /// Number of member descriptors in the table
    pub member_count: u32,
}

impl GroupDescriptor {
    /// Byte offset just past this group's member table
    pub fn table_end(&self) -> u64 {
        u64::from(self.table_pos) + u64::from(self.member_count) * MEMBER_DESCRIPTOR_SIZE
    }
}

/// Member descriptor (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct MemberDescriptor {
    /// NUL-padded base name
    pub name: [u8; NAME_LEN],
    /// Payload size in bytes
    pub size: u32,
    /// Absolute payload offset
    pub offset: u32,
}
