// Command-line front end for blockdelta.
//
//     blockdelta [OPTIONS] <BLOCK_SIZE> <OLD_FILE> <NEW_FILE>
//
// Prints one line per delta block to stdout. Input errors (malformed block
// size, unreadable or too small files, missing arguments) are reported on
// stdout as a single message and the process still exits with status 0.

use std::ffi::OsString;
use std::io::{self, BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser, ValueEnum, ValueHint};

use crate::delta::{Delta, format_delta, sorted_blocks};
use crate::hash::config::{DeltaOptions, MatchStrategy};
use crate::io::{DiffStats, diff_files};

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Block-level rolling-hash delta between two file versions.
#[derive(Parser, Debug)]
#[command(
    name = "blockdelta",
    version,
    about = "Block-level rolling-hash delta between two file versions"
)]
struct Cli {
    /// Block size in bytes (positive integer).
    #[arg(allow_hyphen_values = true)]
    block_size: String,

    /// Old version of the file.
    #[arg(value_hint = ValueHint::FilePath)]
    old_file: PathBuf,

    /// New version of the file.
    #[arg(value_hint = ValueHint::FilePath)]
    new_file: PathBuf,

    /// Candidate lookup strategy.
    #[arg(long, value_enum, default_value_t = StrategyArg::Indexed)]
    strategy: StrategyArg,

    /// Confirm rolling hash matches with SHA-256 block digests.
    #[arg(long)]
    verify: bool,

    /// Print the delta and statistics as JSON.
    #[arg(long = "json")]
    json_output: bool,

    /// Quiet mode (suppress the statistics line, keep the log level).
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Scan,
    Indexed,
}

impl From<StrategyArg> for MatchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Scan => MatchStrategy::Scan,
            StrategyArg::Indexed => MatchStrategy::Indexed,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved options
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Options {
    block_size: NonZeroUsize,
    old_file: PathBuf,
    new_file: PathBuf,
    delta: DeltaOptions,
    json_output: bool,
    quiet: bool,
    verbose: u8,
}

const USAGE: &str = "usage: blockdelta <block-size> <oldfilename> <newfilename>";

/// Parse `argv`. Missing positional arguments yield `Ok(None)`; the caller
/// prints [`USAGE`] instead of a clap error.
fn parse_args<I, T>(argv: I) -> Result<Option<Cli>, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(argv) {
        Ok(cli) => Ok(Some(cli)),
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Parse the block size argument.
fn parse_block_size(s: &str) -> Result<NonZeroUsize, String> {
    let n: i64 = s
        .trim()
        .parse()
        .map_err(|_| "block-size must be integer".to_string())?;
    usize::try_from(n)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| "block-size must be a positive integer".to_string())
}

fn resolve_options(cli: Cli) -> Result<Options, String> {
    Ok(Options {
        block_size: parse_block_size(&cli.block_size)?,
        old_file: cli.old_file,
        new_file: cli.new_file,
        delta: DeltaOptions {
            strategy: cli.strategy.into(),
            verify: cli.verify,
        },
        json_output: cli.json_output,
        quiet: cli.quiet,
        verbose: cli.verbose.min(3),
    })
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("blockdelta".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(Some(cli)) = parse_args(argv) {
        let _ = resolve_options(cli);
    }
}

/// The statistics line goes to stderr at `-v` unless `-q` is given.
fn shows_stats(opts: &Options) -> bool {
    opts.verbose > 0 && !opts.quiet
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn delta_json(delta: &Delta, stats: &DiffStats) -> serde_json::Value {
    let blocks: Vec<serde_json::Value> = sorted_blocks(delta)
        .iter()
        .map(|b| {
            serde_json::json!({
                "op": b.op.code().to_string(),
                "to_start": b.to_start,
                "to_end": b.to_end,
                "from_start": b.from_start,
                "from_end": b.from_end,
            })
        })
        .collect();
    serde_json::json!({
        "block_size": stats.block_size,
        "old_size": stats.old_size,
        "new_size": stats.new_size,
        "signature_blocks": stats.signature_blocks,
        "original": stats.original,
        "moved": stats.moved,
        "changed": stats.changed,
        "blocks": blocks,
    })
}

fn write_delta<W: Write>(out: &mut W, opts: &Options, delta: &Delta, stats: &DiffStats) -> io::Result<()> {
    if opts.json_output {
        let json = delta_json(delta, stats);
        serde_json::to_writer_pretty(&mut *out, &json)?;
        writeln!(out)?;
    } else {
        // The formatted lines are followed by one blank line.
        writeln!(out, "{}", format_delta(delta))?;
    }
    out.flush()
}

// ---------------------------------------------------------------------------
// Diff command
// ---------------------------------------------------------------------------

fn cmd_diff<W: Write>(opts: &Options, out: &mut W) -> i32 {
    let (delta, stats) = match diff_files(&opts.old_file, &opts.new_file, opts.block_size, &opts.delta) {
        Ok(r) => r,
        Err(e) => {
            log::debug!("diff failed: {e:?}");
            return report(out, &e.to_string());
        }
    };

    if let Err(e) = write_delta(out, opts, &delta, &stats) {
        eprintln!("blockdelta: write error: {e}");
        return 1;
    }

    if shows_stats(opts) {
        eprintln!(
            "blockdelta: old size: {}, new size: {}, block size: {}, blocks: {}, \
             original: {}, moved: {}, changed: {}",
            stats.old_size,
            stats.new_size,
            stats.block_size,
            stats.signature_blocks,
            stats.original,
            stats.moved,
            stats.changed
        );
    }

    0
}

/// Print an input error on `out`. Input errors do not change the exit status.
fn report<W: Write>(out: &mut W, message: &str) -> i32 {
    match writeln!(out, "{message}").and_then(|()| out.flush()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("blockdelta: write error: {e}");
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = match parse_args(std::env::args_os()) {
        Ok(Some(cli)) => cli,
        Ok(None) => process::exit(report(&mut io::stdout().lock(), USAGE)),
        Err(e) => e.exit(),
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(cli.verbose)),
    )
    .format_timestamp(None)
    .format_target(false)
    .init();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let exit_code = match resolve_options(cli) {
        Ok(opts) => cmd_diff(&opts, &mut out),
        Err(message) => report(&mut out, &message),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
