//! Grouping and validation of candidates into an archive plan
//!
//! An [`ArchivePlan`] is the immutable skeleton of an archive: validated
//! names grouped by extension, with sizes but no offsets. Offsets are only
//! assigned by [`ArchivePlan::layout`], which produces a [`DatArchive`].

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};

use tracing::debug;

use crate::archive::DatArchive;
use crate::candidate::{Candidate, CandidateSource};
use crate::entry::MemberEntry;
use crate::error::{Result, ValidationError};
use crate::ident::{Extension, MemberName};
use crate::layout;
use crate::writer::PayloadSource;

/// A validated member awaiting layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMember {
    /// Validated base name
    pub name: MemberName,
    /// Payload size in bytes
    pub size: u32,
    /// Where the payload is read from at encode time
    pub source: CandidateSource,
}

/// Validated members sharing one extension, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGroup {
    /// Shared extension
    pub extension: Extension,
    /// Members in discovery order
    pub members: Vec<PlannedMember>,
}

/// A candidate that was skipped, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Candidate file name or path
    pub file: String,
    /// Why it was skipped
    pub error: ValidationError,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} skipped.", self.error, self.file)
    }
}

/// Validated grouping of input files, ready for layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivePlan {
    groups: Vec<PlannedGroup>,
    index: HashMap<Extension, usize>,
}

impl ArchivePlan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and group every candidate, collecting rejections
    ///
    /// Invalid candidates never abort the batch; they are reported in the
    /// returned rejection list in input order.
    pub fn from_candidates<I>(candidates: I) -> (Self, Vec<Rejection>)
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut plan = Self::new();
        let mut rejections = Vec::new();

        for candidate in candidates {
            if let Err(rejection) = plan.add_candidate(candidate) {
                debug!("Rejected {}: {}", rejection.file, rejection.error);
                rejections.push(rejection);
            }
        }

        (plan, rejections)
    }

    /// Validate one candidate and append it to its extension group
    pub fn add_candidate(&mut self, candidate: Candidate) -> std::result::Result<(), Rejection> {
        match validate(&candidate) {
            Ok((name, extension, size)) => {
                self.push(
                    extension,
                    PlannedMember {
                        name,
                        size,
                        source: candidate.source,
                    },
                );
                Ok(())
            }
            Err(error) => Err(Rejection {
                file: candidate.file_name,
                error,
            }),
        }
    }

    fn push(&mut self, extension: Extension, member: PlannedMember) {
        let slot = match self.index.get(&extension) {
            Some(&slot) => slot,
            None => {
                self.groups.push(PlannedGroup {
                    extension: extension.clone(),
                    members: Vec::new(),
                });
                self.index.insert(extension, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].members.push(member);
    }

    /// Groups in first-seen order
    pub fn groups(&self) -> &[PlannedGroup] {
        &self.groups
    }

    /// Total number of accepted members
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.members.len()).sum()
    }

    /// Whether no candidate was accepted
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Assign table positions and payload offsets
    ///
    /// Pure and deterministic: the result depends only on group order,
    /// member order and sizes.
    pub fn layout(&self) -> Result<DatArchive> {
        layout::layout(self)
    }
}

fn validate(
    candidate: &Candidate,
) -> std::result::Result<(MemberName, Extension, u32), ValidationError> {
    if !candidate.name.is_ascii() || !candidate.extension.is_ascii() {
        return Err(ValidationError::NonAscii);
    }
    let extension = Extension::new(&candidate.extension)?;
    let name = MemberName::new(&candidate.name)?;
    let size = u32::try_from(candidate.size).map_err(|_| ValidationError::TooLarge(candidate.size))?;
    Ok((name, extension, size))
}

impl PayloadSource for ArchivePlan {
    fn open(
        &mut self,
        group: usize,
        member: usize,
        entry: &MemberEntry,
    ) -> std::io::Result<Box<dyn Read + '_>> {
        let planned = self
            .groups
            .get(group)
            .and_then(|g| g.members.get(member))
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no planned source for {}", entry.name),
                )
            })?;

        match &planned.source {
            CandidateSource::File(path) => Ok(Box::new(File::open(path)?)),
            CandidateSource::Memory(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
        }
    }
}
