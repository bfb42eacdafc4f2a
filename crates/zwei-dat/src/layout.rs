//! Offset assignment for a validated plan
//!
//! The canonical layout places, in order: the header, every group
//! descriptor, every group's member table, then every payload. Groups and
//! members keep their plan order throughout.

use tracing::debug;

use crate::archive::DatArchive;
use crate::entry::{ExtensionGroup, MemberEntry};
use crate::error::{DatError, Result};
use crate::header::{GROUP_DESCRIPTOR_SIZE, HEADER_SIZE, MEMBER_DESCRIPTOR_SIZE};
use crate::plan::ArchivePlan;

pub(crate) fn layout(plan: &ArchivePlan) -> Result<DatArchive> {
    let groups = plan.groups();

    let mut cursor = HEADER_SIZE + groups.len() as u64 * GROUP_DESCRIPTOR_SIZE;
    let mut table_positions = Vec::with_capacity(groups.len());
    for group in groups {
        table_positions.push(to_u32(cursor)?);
        cursor += group.members.len() as u64 * MEMBER_DESCRIPTOR_SIZE;
    }

    let payload_start = cursor;
    let mut laid_out = Vec::with_capacity(groups.len());
    for (group, table_pos) in groups.iter().zip(table_positions) {
        let mut members = Vec::with_capacity(group.members.len());
        for member in &group.members {
            members.push(MemberEntry::new(
                member.name.as_str(),
                member.size,
                to_u32(cursor)?,
            ));
            cursor += u64::from(member.size);
        }
        laid_out.push(ExtensionGroup::new(
            group.extension.as_str(),
            table_pos,
            members,
        ));
    }

    // The final payload must end within 32-bit addressable space too
    to_u32(cursor)?;

    debug!(
        "Laid out {} groups, payloads at {}..{}",
        laid_out.len(),
        payload_start,
        cursor
    );

    Ok(DatArchive::new(laid_out))
}

fn to_u32(position: u64) -> Result<u32> {
    u32::try_from(position).map_err(|_| DatError::ArchiveTooLarge(position))
}
