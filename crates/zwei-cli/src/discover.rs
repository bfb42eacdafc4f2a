//! Input file discovery for packing

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::trace;
use walkdir::{DirEntry, WalkDir};

/// Names skipped during discovery: dot files (`.git`, `.DS_Store`) and
/// double-underscore entries (`__MACOSX`)
pub fn is_ignored_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("__")
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.depth() > 0 && is_ignored_name(&entry.file_name().to_string_lossy())
}

/// Recursively collect the files under each root, in a stable order
///
/// Roots that are files are returned as-is. Ignored directories are not
/// descended into.
pub fn collect_files(roots: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        collect_from(root, &mut files)?;
    }
    Ok(files)
}

fn collect_from(root: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e));

    for entry in walker {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if is_file {
            trace!("Found {:?}", entry.path());
            files.push(entry.into_path());
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_ignored_names() {
        assert!(is_ignored_name(".git"));
        assert!(is_ignored_name("__MACOSX"));
        assert!(!is_ignored_name("map01.bmp"));
        assert!(!is_ignored_name("_single"));
    }

    #[test]
    fn test_collect_skips_hidden_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("__MACOSX")).unwrap();
        fs::write(root.join("b.txt"), b"b").unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join(".hidden.txt"), b"h").unwrap();
        fs::write(root.join("sub").join("c.bin"), b"c").unwrap();
        fs::write(root.join(".git").join("config.txt"), b"x").unwrap();
        fs::write(root.join("__MACOSX").join("d.txt"), b"x").unwrap();

        let files = collect_files(&[root.to_path_buf()]).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("a.txt"),
                root.join("b.txt"),
                root.join("sub").join("c.bin"),
            ]
        );
    }

    #[test]
    fn test_collect_file_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("single.txt");
        fs::write(&file, b"x").unwrap();

        assert_eq!(collect_files(&[file.clone()]).unwrap(), vec![file]);
    }

    #[test]
    fn test_collect_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_files(&[dir.path().join("missing")]).is_err());
    }
}
