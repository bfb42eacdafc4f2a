//! Zwei!! DAT archive tool library
//!
//! This library provides the core functionality for the `zwei` CLI tool:
//! mode selection, input discovery, output naming and the pack/unpack
//! commands built on top of `zwei-dat`.

#![forbid(unsafe_code)]

pub mod commands;
pub mod discover;
pub mod naming;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::bail;

pub use crate::commands::{pack::run as run_pack, unpack::run as run_unpack};

/// Output format for test (inspect) mode
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

/// What to do with the inputs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Build a new archive from files and folders
    Pack,
    /// Extract one or more archives
    Unpack,
}

/// Settings shared by both commands
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Print what would happen instead of writing anything
    pub test: bool,
    /// Suppress per-file output
    pub quiet: bool,
    /// Format of test mode output
    pub format: OutputFormat,
    /// Directory for new archives and extraction folders (current directory if unset)
    pub output_dir: Option<PathBuf>,
    /// Number of archive names tried before giving up
    pub max_name_attempts: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            test: false,
            quiet: false,
            format: OutputFormat::Text,
            output_dir: None,
            max_name_attempts: zwei_dat::DEFAULT_MAX_NAME_ATTEMPTS,
        }
    }
}

impl RunOptions {
    /// Place `relative` under the configured output directory
    pub fn output_path(&self, relative: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(relative),
            None => relative.to_path_buf(),
        }
    }
}

/// Decide between packing and unpacking
///
/// Explicit flags win. Otherwise a directory as the first input means pack
/// and an existing `.dat` file means unpack.
pub fn select_mode(pack: bool, unpack: bool, inputs: &[PathBuf]) -> anyhow::Result<Mode> {
    if pack && unpack {
        bail!("You cannot both pack and unpack the input.");
    }
    let Some(first) = inputs.first() else {
        bail!("No files. Please provide a .DAT file to unpack or a folder to pack.");
    };

    if pack {
        return Ok(Mode::Pack);
    }
    if unpack {
        return Ok(Mode::Unpack);
    }
    if first.is_dir() {
        return Ok(Mode::Pack);
    }
    if first.is_file() && naming::is_dat_name(first) {
        return Ok(Mode::Unpack);
    }
    bail!("Unknown file(s). Please provide a .DAT file to unpack or a folder to pack.")
}

/// Run the selected command; returns whether everything succeeded
pub fn run(mode: Mode, inputs: &[PathBuf], options: &RunOptions) -> anyhow::Result<bool> {
    match mode {
        Mode::Pack => {
            run_pack(inputs, options)?;
            Ok(true)
        }
        Mode::Unpack => Ok(run_unpack(inputs, options).all_succeeded()),
    }
}
