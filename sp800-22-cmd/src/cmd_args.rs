//! Everything necessary for command line arguments.

use crate::{InputFormat, LogLevel};
use clap::{Args, Parser};
use std::num::NonZero;
use std::path::PathBuf;

/// Runs the NIST SP 800-22 test suite on a file of random bits.
#[derive(Debug, Parser)]
#[command(version, author, about, long_about = None)]
pub struct CmdArgs {
    /// TOML configuration file. Needed unless `--input` is given.
    ///
    /// Switches given on the command line replace the values from this file.
    #[arg(short, long, required_unless_present = "input_file")]
    pub config_file: Option<PathBuf>,
    #[command(flatten)]
    pub regular_args: RegularArgs,
}

/// Switches that may also come from the configuration file.
#[derive(Debug, Clone, Default, Args)]
#[group(required = false, multiple = true)]
pub struct RegularArgs {
    /// File holding the bits to test.
    #[arg(short, long = "input", requires = "input_format")]
    pub input_file: Option<PathBuf>,
    /// How the input file encodes the bits.
    #[arg(short = 'f', long)]
    pub input_format: Option<InputFormat>,
    /// Test only the first bits of the input, up to this count.
    #[arg(short = 'l', long)]
    pub max_length: Option<NonZero<usize>>,
    /// Cut the input into consecutive parts of `--max-length` bits and test each one.
    ///
    /// The length has to be a multiple of 8, a trailing partial part is dropped.
    /// With `--output`, part i is written to "<STEM>_<i>.<EXT>".
    #[arg(long, requires = "max_length")]
    pub split: bool,
    /// Upper bound on the input length in bits, default 10 000 000.
    #[arg(long)]
    pub max_bits: Option<NonZero<usize>>,
    /// Thread count for running the tests concurrently. Sequential if unset.
    #[arg(short = 'j', long)]
    pub threads: Option<NonZero<usize>>,
    /// Write the results as CSV to this path.
    ///
    /// Columns, separated by ';': test name, time in ms, result no, PASS/FAIL/SKIPPED,
    /// p-value, comment. Tests with several results get one row each. Skipped tests have
    /// a p-value of -1 and the reason as comment.
    #[arg(short, long = "output")]
    pub output_path: Option<PathBuf>,
    /// Overrides for the `[arguments]` table of the config file, e.g. 'serial.block-length = 3'.
    #[arg(long, value_delimiter = ',')]
    pub overrides: Option<Vec<String>>,
    /// Print only whether every test passed instead of the full report.
    #[arg(long)]
    pub no_console: bool,
    /// Minimum level of the log messages written to stderr.
    #[arg(long, env = "LOG_LEVEL", ignore_case = true)]
    pub log_level: Option<LogLevel>,
}
