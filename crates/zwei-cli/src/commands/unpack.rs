//! Extract one or more archives

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, error, info};
use zwei_dat::{DatError, DatReader};

use crate::RunOptions;
use crate::naming::{extraction_dir_name, is_dat_name};
use crate::output::print_archive;

/// Outcome counts of an unpack batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnpackSummary {
    /// Archives extracted (or inspected in test mode)
    pub extracted: usize,
    /// Inputs that were not archives and were passed over in a batch
    pub skipped: usize,
    /// Inputs reported as errors
    pub failed: usize,
}

impl UnpackSummary {
    /// Whether no input was reported as an error
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

enum Outcome {
    Extracted,
    Skipped,
}

/// Unpack every input, continuing past failures
///
/// A missing input is always an error. With more than one input, files
/// that are not DAT archives are skipped without an error.
pub fn run(inputs: &[PathBuf], options: &RunOptions) -> UnpackSummary {
    if !options.quiet {
        println!("Unpacking {} files...", inputs.len());
    }

    let batch = inputs.len() != 1;
    let mut summary = UnpackSummary::default();
    for input in inputs {
        match unpack_one(input, batch, options) {
            Ok(Outcome::Extracted) => summary.extracted += 1,
            Ok(Outcome::Skipped) => summary.skipped += 1,
            Err(e) => {
                error!("Error: {e:#}");
                summary.failed += 1;
            }
        }
    }

    info!(
        "Unpacked {} archives ({} skipped, {} failed)",
        summary.extracted, summary.skipped, summary.failed
    );
    summary
}

fn unpack_one(path: &Path, batch: bool, options: &RunOptions) -> anyhow::Result<Outcome> {
    if !path.is_file() {
        anyhow::bail!("File not found: {}", path.display());
    }

    if !is_dat_name(path) {
        if batch {
            debug!("Skipping {:?}: not a .dat file", path);
            return Ok(Outcome::Skipped);
        }
        anyhow::bail!(
            "Not an archive of the correct format [file name error]: {}",
            path.display()
        );
    }

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = match DatReader::open(BufReader::new(file)) {
        Ok(reader) => reader,
        Err(DatError::InvalidMagic(found)) if batch => {
            debug!("Skipping {:?}: magic number {found}", path);
            return Ok(Outcome::Skipped);
        }
        Err(DatError::InvalidMagic(_)) => anyhow::bail!(
            "Not an archive of the correct format [magic number error]: {}",
            path.display()
        ),
        Err(e) => return Err(e).with_context(|| format!("parsing {}", path.display())),
    };

    if !options.quiet || options.test {
        let name = path.file_name().unwrap_or(path.as_os_str());
        println!("{}", name.to_string_lossy());
    }

    if options.test {
        print_archive(reader.archive(), options.format)?;
        return Ok(Outcome::Extracted);
    }

    let dir = options.output_path(&extraction_dir_name(path));
    let quiet = options.quiet;
    reader
        .extract_each(&dir, |out| {
            if !quiet {
                println!("{}", out.display());
            }
        })
        .with_context(|| format!("extracting {}", path.display()))?;
    Ok(Outcome::Extracted)
}
