use clap::Parser;
use std::io::{BufRead, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use zwei_cli::{OutputFormat, RunOptions, run, select_mode};

#[derive(Parser)]
#[command(
    name = "zwei",
    about = "Packs and unpacks Zwei!! [Zwei: The Arges Adventure] DAT archives",
    version,
    author,
    long_about = "Packs a folder of 8.3 named files into a Zwei!! DAT archive, or extracts one or more DAT archives into folders named after them. Without -p or -u the mode is picked from the first input: a folder is packed, a .dat file is unpacked."
)]
struct Cli {
    /// Try unpacking
    #[arg(short, long)]
    unpack: bool,

    /// Try packing
    #[arg(short, long, conflicts_with = "unpack")]
    pack: bool,

    /// Do not write output and print what would happen instead
    #[arg(short, long)]
    test: bool,

    /// Suppress per-file output
    #[arg(short, long)]
    quiet: bool,

    /// Suppress pause on completion, if invoked from a shell
    #[arg(short = 's', long)]
    from_sh: bool,

    /// Set the logging level
    #[arg(short, long, value_enum, env = "ZWEI_LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Output format for test mode
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Directory for new archives and extraction folders
    #[arg(short, long, env = "ZWEI_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Number of archive names tried when the output already exists
    #[arg(long, default_value_t = zwei_dat::DEFAULT_MAX_NAME_ATTEMPTS)]
    max_name_attempts: usize,

    /// File(s) to read
    #[arg(value_name = "INFILE")]
    infile: Vec<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn pause() {
    println!("Press Enter to close...");
    let mut line = String::new();
    // Nothing to do if stdin is closed
    let _ = std::io::stdin().lock().read_line(&mut line);
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG overrides --log-level when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from(Level::from(cli.log_level)).into())
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let options = RunOptions {
        test: cli.test,
        quiet: cli.quiet,
        format: cli.format,
        output_dir: cli.output_dir,
        max_name_attempts: cli.max_name_attempts,
    };

    let succeeded = match select_mode(cli.pack, cli.unpack, &cli.infile)
        .and_then(|mode| run(mode, &cli.infile, &options))
    {
        Ok(succeeded) => succeeded,
        Err(e) => {
            error!("Error: {e:#}");
            false
        }
    };

    if !cli.from_sh {
        pause();
    }

    if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
