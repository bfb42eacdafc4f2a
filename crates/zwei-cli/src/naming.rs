//! Archive and extraction path naming

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use tracing::debug;
use zwei_dat::DatError;

const DAT_SUFFIX: &str = ".dat";

/// Whether the file name ends in `.dat` (any case) with a non-empty stem
pub fn is_dat_name(path: &Path) -> bool {
    path.file_name().map(|n| n.as_encoded_bytes()).is_some_and(|n| {
        n.len() > DAT_SUFFIX.len()
            && n[n.len() - DAT_SUFFIX.len()..].eq_ignore_ascii_case(DAT_SUFFIX.as_bytes())
    })
}

/// Drop a trailing `.dat`/`.DAT` from the last path component
pub fn strip_dat_suffix(path: &Path) -> PathBuf {
    if !is_dat_name(path) {
        return path.to_path_buf();
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // The suffix is ASCII, so this is a char boundary
    path.with_file_name(&name[..name.len() - DAT_SUFFIX.len()])
}

/// Folder an archive is extracted into: its file name without `.dat`
pub fn extraction_dir_name(archive: &Path) -> PathBuf {
    let name = archive.file_name().map(PathBuf::from).unwrap_or_default();
    strip_dat_suffix(&name)
}

fn numbered(stem: &Path, attempt: usize) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    if attempt == 0 {
        name.push(DAT_SUFFIX);
    } else {
        name.push(format!("-{attempt}{DAT_SUFFIX}"));
    }
    PathBuf::from(name)
}

/// Pick the first free archive name among `<stem>.dat`, `<stem>-1.dat`, ...
///
/// At most `max_attempts` names are tried.
pub fn resolve_output_path(stem: &Path, max_attempts: usize) -> Result<PathBuf, DatError> {
    for attempt in 0..max_attempts {
        let candidate = numbered(stem, attempt);
        if !candidate.exists() {
            return Ok(candidate);
        }
        debug!("{:?} exists, trying next name", candidate);
    }
    Err(DatError::NoAvailableName(numbered(stem, 0)))
}

/// Archive stem and the inputs to pack, from the command line inputs
///
/// A directory first names the archive after itself and packs every input;
/// a `.dat` path first names the archive and packs the remaining inputs.
pub fn archive_target(inputs: &[PathBuf]) -> anyhow::Result<(PathBuf, Vec<PathBuf>)> {
    let Some(first) = inputs.first() else {
        bail!("No files. Please provide a .DAT file to unpack or a folder to pack.");
    };

    if first.is_dir() {
        let resolved = fs::canonicalize(first)
            .with_context(|| format!("resolving {}", first.display()))?;
        let Some(name) = resolved.file_name() else {
            bail!("Archive name invalid.");
        };
        return Ok((PathBuf::from(name), inputs.to_vec()));
    }

    if is_dat_name(first) {
        return Ok((strip_dat_suffix(first), inputs[1..].to_vec()));
    }

    bail!("Unknown file(s). Please provide a .DAT file or existing folder to pack it.")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_dat_name() {
        assert!(is_dat_name(Path::new("x.dat")));
        assert!(is_dat_name(Path::new("dir/SYSTEM.DAT")));
        assert!(!is_dat_name(Path::new(".dat")));
        assert!(!is_dat_name(Path::new("x.bin")));
        assert!(!is_dat_name(Path::new("dat")));
    }

    #[test]
    fn test_strip_dat_suffix() {
        assert_eq!(strip_dat_suffix(Path::new("out/X.DAT")), PathBuf::from("out/X"));
        assert_eq!(strip_dat_suffix(Path::new("x.dat")), PathBuf::from("x"));
        assert_eq!(strip_dat_suffix(Path::new("x.bin")), PathBuf::from("x.bin"));
        assert_eq!(extraction_dir_name(Path::new("a/b/MAP.dat")), PathBuf::from("MAP"));
    }

    #[test]
    fn test_collision_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("X");

        assert_eq!(resolve_output_path(&stem, 100).unwrap(), dir.path().join("X.dat"));

        std::fs::write(dir.path().join("X.dat"), b"").unwrap();
        assert_eq!(resolve_output_path(&stem, 100).unwrap(), dir.path().join("X-1.dat"));

        std::fs::write(dir.path().join("X-1.dat"), b"").unwrap();
        assert_eq!(resolve_output_path(&stem, 100).unwrap(), dir.path().join("X-2.dat"));
    }

    #[test]
    fn test_collision_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let stem = dir.path().join("X");
        std::fs::write(dir.path().join("X.dat"), b"").unwrap();
        std::fs::write(dir.path().join("X-1.dat"), b"").unwrap();
        std::fs::write(dir.path().join("X-2.dat"), b"").unwrap();

        let err = resolve_output_path(&stem, 3).unwrap_err();
        assert!(matches!(err, DatError::NoAvailableName(ref p) if p == &dir.path().join("X.dat")));
        assert!(resolve_output_path(&stem, 0).is_err());
    }

    #[test]
    fn test_archive_target() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("stage");
        std::fs::create_dir(&folder).unwrap();

        let (stem, sources) = archive_target(&[folder.clone()]).unwrap();
        assert_eq!(stem, PathBuf::from("stage"));
        assert_eq!(sources, vec![folder.clone()]);

        let named = dir.path().join("pack.DAT");
        let (stem, sources) = archive_target(&[named, folder.clone()]).unwrap();
        assert_eq!(stem, dir.path().join("pack"));
        assert_eq!(sources, vec![folder]);

        assert!(archive_target(&[dir.path().join("loose.txt")]).is_err());
    }
}
