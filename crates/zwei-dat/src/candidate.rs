//! Input files offered for packing, before validation

use std::fmt;
use std::path::{Path, PathBuf};

/// Where a candidate's payload bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// File on disk, opened lazily when the archive is encoded
    File(PathBuf),
    /// Bytes already held in memory
    Memory(Vec<u8>),
}

/// A file offered for packing
///
/// `name` and `extension` are already case-normalized; the extension is
/// stored without its leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Payload source
    pub source: CandidateSource,
    /// Original file name, used in diagnostics
    pub file_name: String,
    /// Lowercased base name
    pub name: String,
    /// Lowercased extension without dot (empty if the file has none)
    pub extension: String,
    /// Payload size in bytes
    pub size: u64,
}

impl Candidate {
    /// Describe a file on disk; reads its size from metadata
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (name, extension) = split_file_name(&file_name);

        Ok(Self {
            source: CandidateSource::File(path.to_path_buf()),
            file_name: path.display().to_string(),
            name,
            extension,
            size,
        })
    }

    /// Describe an in-memory file
    pub fn from_bytes(file_name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let (name, extension) = split_file_name(file_name);

        Self {
            size: bytes.len() as u64,
            source: CandidateSource::Memory(bytes),
            file_name: file_name.to_string(),
            name,
            extension,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name)
    }
}

/// Lowercase a file name and split it at its last dot
///
/// Leading dots belong to the base name, so `.profile` has no extension.
pub fn split_file_name(file_name: &str) -> (String, String) {
    let lower = file_name.to_lowercase();
    let body_start = lower.len() - lower.trim_start_matches('.').len();

    match lower[body_start..].rfind('.') {
        Some(dot) => {
            let dot = body_start + dot;
            (lower[..dot].to_string(), lower[dot + 1..].to_string())
        }
        None => (lower, String::new()),
    }
}
