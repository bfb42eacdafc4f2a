//! Build a new archive from files and folders

use std::path::PathBuf;

use anyhow::Context;
use tracing::{info, warn};
use zwei_dat::{ArchivePlan, Candidate, CandidateSource, write_archive};

use crate::RunOptions;
use crate::discover::collect_files;
use crate::naming::{archive_target, resolve_output_path};
use crate::output::print_archive;

/// Pack `inputs` into a new archive
///
/// Files that fail validation are reported and skipped. Returns the path of
/// the written archive, or `None` in test mode.
pub fn run(inputs: &[PathBuf], options: &RunOptions) -> anyhow::Result<Option<PathBuf>> {
    let (stem, sources) = archive_target(inputs)?;
    let output = resolve_output_path(&options.output_path(&stem), options.max_name_attempts)?;
    let files = collect_files(&sources)?;

    if !options.quiet {
        println!("Packing {} files into {}...", files.len(), output.display());
    }

    let mut candidates = Vec::with_capacity(files.len());
    for file in &files {
        let candidate =
            Candidate::from_path(file).with_context(|| format!("reading {}", file.display()))?;
        candidates.push(candidate);
    }

    let (mut plan, rejections) = ArchivePlan::from_candidates(candidates);
    for rejection in &rejections {
        warn!("Error: {rejection}");
    }

    if options.test {
        let archive = plan.layout()?;
        print_archive(&archive, options.format)?;
        return Ok(None);
    }

    if !options.quiet {
        for group in plan.groups() {
            for member in &group.members {
                match &member.source {
                    CandidateSource::File(path) => println!("{}", path.display()),
                    CandidateSource::Memory(_) => println!("{}.{}", member.name, group.extension),
                }
            }
        }
    }

    let archive = write_archive(&mut plan, &output)
        .with_context(|| format!("writing {}", output.display()))?;
    info!(
        "Packed {} files ({} skipped) into {}",
        archive.member_count(),
        rejections.len(),
        output.display()
    );
    Ok(Some(output))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use zwei_dat::DatReader;

    fn options(out: &std::path::Path) -> RunOptions {
        RunOptions {
            quiet: true,
            output_dir: Some(out.to_path_buf()),
            ..RunOptions::default()
        }
    }

    #[test]
    fn test_pack_directory() {
        let dir = tempfile::tempdir().unwrap();
        let stage = dir.path().join("stage");
        fs::create_dir_all(stage.join("nested")).unwrap();
        fs::write(stage.join("map01.map"), b"map").unwrap();
        fs::write(stage.join("nested").join("TITLE.BMP"), b"bmp!").unwrap();
        fs::write(stage.join("toolongname.txt"), b"skip").unwrap();

        let out = dir.path().join("out");
        let written = run(&[stage], &options(&out)).unwrap().unwrap();
        assert_eq!(written, out.join("stage.dat"));

        let mut reader = DatReader::open(fs::File::open(&written).unwrap()).unwrap();
        assert_eq!(reader.archive().member_count(), 2);
        assert_eq!(reader.extract_by_name("title.bmp").unwrap().unwrap(), b"bmp!");
    }

    #[test]
    fn test_pack_named_archive_and_collision() {
        let dir = tempfile::tempdir().unwrap();
        let stage = dir.path().join("stage");
        fs::create_dir(&stage).unwrap();
        fs::write(stage.join("a.txt"), b"a").unwrap();

        let out = dir.path().join("out");
        let inputs = [PathBuf::from("custom.DAT"), stage];
        let first = run(&inputs, &options(&out)).unwrap().unwrap();
        let second = run(&inputs, &options(&out)).unwrap().unwrap();

        assert_eq!(first, out.join("custom.dat"));
        assert_eq!(second, out.join("custom-1.dat"));
    }

    #[test]
    fn test_pack_test_mode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let stage = dir.path().join("stage");
        fs::create_dir(&stage).unwrap();
        fs::write(stage.join("a.txt"), b"a").unwrap();

        let out = dir.path().join("out");
        let opts = RunOptions {
            test: true,
            ..options(&out)
        };
        assert_eq!(run(&[stage], &opts).unwrap(), None);
        assert!(!out.join("stage.dat").exists());
    }
}
