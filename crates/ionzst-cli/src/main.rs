//! `ionzst`: dump a zstd-compressed Ion object as Ion text.
//!
//! ```text
//! ionzst -f [s3://]<bucket>/<key>.ion.zst -e <endpoint> [OPTIONS]
//! ionzst -f file://<path>.ion.zst [OPTIONS]
//! ```
//!
//! Ion text goes to stdout, logs to stderr.
//!
//! # Exit codes
//!
//! | Code | Meaning                                       |
//! |------|-----------------------------------------------|
//! | 0    | The whole object was dumped                   |
//! | 1    | Any error (locator, credentials, I/O, format) |
//! | 2    | Missing or malformed arguments (from `clap`)  |

use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use ionzst_driver::{FileSource, PipelineReport, dump};
use tracing::{Level, info};

mod config;
mod credentials;
mod locator;
mod s3;

use config::{Config, Environment};
use locator::Locator;
use s3::S3Source;

/// Dump a zstd-compressed Ion (`.ion.zst`) object as Ion text.
#[derive(Parser, Debug)]
#[command(name = "ionzst", version)]
pub struct Cli {
    /// Object to dump: `[s3://]bucket/path/to/object.ion.zst` or
    /// `file://path/to/object.ion.zst`.
    #[arg(short = 'f', long = "file", value_name = "LOCATOR")]
    pub file: String,

    /// S3-compatible endpoint, `host[:port]` or a full URL.
    #[arg(short = 'e', long)]
    pub endpoint: Option<String>,

    /// Credentials profile (default: `$AWS_PROFILE`, then `default`).
    #[arg(long)]
    pub profile: Option<String>,

    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    /// Credentials file (default: `$AWS_SHARED_CREDENTIALS_FILE`, then
    /// `~/.aws/credentials`).
    #[arg(long, value_name = "PATH")]
    pub credentials_file: Option<PathBuf>,

    /// Allow plain `http://` endpoints.
    #[arg(long)]
    pub allow_http: bool,

    /// Use virtual-hosted-style bucket URLs instead of path style.
    #[arg(long)]
    pub virtual_hosted: bool,

    /// Indent nested values instead of one value per line.
    #[arg(long)]
    pub pretty: bool,

    /// Chunks buffered between pipeline stages (0 = rendezvous).
    #[arg(long, default_value_t = 0, value_name = "CHUNKS")]
    pub handoff_capacity: usize,

    /// More logging on stderr; repeat for more.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<PipelineReport> {
    let config = Config::from_cli(cli, &Environment::capture())?;
    info!(locator = %config.locator, "dumping object");

    let out = BufWriter::new(io::stdout());
    let report = match &config.locator {
        Locator::File(path) => dump(&FileSource::new(path), out, &config.pipeline),
        Locator::S3 { bucket, key } => {
            let source = S3Source::connect(bucket, key, &config.s3)?;
            dump(&source, out, &config.pipeline)
        }
    };
    report.with_context(|| format!("dumping {}", config.locator))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
