use anyhow::Context;
use clap::Parser;
use log::{debug, info, warn};
use sp800_22_cmd::cmd_args::CmdArgs;
use sp800_22_cmd::csv::CsvFile;
use sp800_22_cmd::toml_config::TomlConfig;
use sp800_22_cmd::valid_arg::{MaxLengthOrSplit, ValidatedConfig};
use sp800_22_cmd::InputFormat;
use sp800_22_lib::bitvec::BitVec;
use sp800_22_lib::test_runner::{MultiThreadedTestRunner, SuiteObserver};
use sp800_22_lib::{Suite, SuiteResult, Test, TestSummary, VERSION};
use std::ffi::OsStr;
use std::fs;
use std::io::{ErrorKind, Read, Seek};
use std::path::Path;
use std::str::from_utf8;

/// If multiple parts are tested in one execution
#[derive(Debug, Copy, Clone)]
struct Parts {
    /// The current part number, starting with 1
    current: u64,
    /// How many parts there will be
    count: u64,
}

/// Logs the progress of a suite run.
#[derive(Debug, Clone, Copy)]
struct LogObserver {
    parts: Option<Parts>,
}

impl SuiteObserver for LogObserver {
    fn test_started(&self, test: Test) {
        match self.parts {
            Some(parts) => debug!("{} / {}: starting {}", parts.current, parts.count, test.name()),
            None => debug!("starting {}", test.name()),
        }
    }

    fn test_finished(&self, summary: &TestSummary) {
        let time_as_ms = (summary.elapsed.as_micros() as f64) / 1000.0;

        if summary.is_skipped() {
            warn!(
                "{} skipped after {time_as_ms}ms: {}",
                summary.name,
                summary.warning.as_deref().unwrap_or("no reason given")
            );
        } else {
            info!(
                "{} finished after {time_as_ms}ms, p-value {}",
                summary.name, summary.p_value
            );
        }
    }
}

/// Main function.
///
/// On success: prints the test results to stdout, exit code SUCCESS.
/// On error: prints the error to stderr, exit code FAILURE.
///
/// This program takes some arguments and an optional config file, use `--help`.
fn main() -> anyhow::Result<()> {
    let CmdArgs {
        config_file,
        regular_args,
    } = CmdArgs::parse();

    // parse configuration
    let config = if let Some(config_file) = config_file {
        let toml = fs::read_to_string(&config_file)
            .with_context(|| format!("Failed to read config file \"{}\"", config_file.display()))?;

        let toml_config: TomlConfig =
            toml::from_str(&toml).context("Failed to parse the config file")?;
        ValidatedConfig::try_from_toml(toml_config, regular_args)
    } else {
        ValidatedConfig::try_from_cmd_args(regular_args)
    }
    .map_err(|err| anyhow::anyhow!(err))?;

    env_logger::Builder::new()
        .filter_level(config.log_level.into())
        .format_timestamp_millis()
        .init();

    info!("sp800-22 test suite, engine version {VERSION}");
    println!("Reading input file: \"{}\"", config.input_file.display());
    println!();

    let passed = match config.input_format {
        InputFormat::Binary | InputFormat::Ascii => handle_ascii_or_binary_input(&config),
        InputFormat::AsciiLossy => handle_ascii_lossy_input(&config),
    }?;

    if passed {
        println!("All tests passed.");
    } else {
        println!("One or more tests failed / did not pass.");
    }

    Ok(())
}

/// Handles ASCII or binary input, converting the raw bytes into a BitVec based on the file format.
///
/// Returns true if all tests passed.
fn handle_ascii_or_binary_input(config: &ValidatedConfig) -> anyhow::Result<bool> {
    // use the right converter function
    let converter: fn(&[u8]) -> anyhow::Result<BitVec<'static>> = match config.input_format {
        InputFormat::Ascii => |input| {
            let input = from_utf8(input).context("Input file contains non-UTF-8 chars")?;
            BitVec::from_ascii_str(input)
                .context("Input file contains characters other than '0' or '1'")
        },
        _ => |input| Ok(BitVec::from(input.to_vec())),
    };

    let mut file = fs::File::open(&config.input_file).context("Failed to open input file")?;

    // Read only the necessary amount of bytes
    match config.max_length_or_split {
        MaxLengthOrSplit::MaxLength(max_length) => {
            let count_bytes = match config.input_format {
                InputFormat::Ascii => max_length.get(), // 1 Bit per Byte
                _ => max_length.get().div_ceil(8),     // 8 Bits per Byte
            };

            let mut input = vec![0; count_bytes];
            let res = file.read_exact(&mut input);

            if let Err(e) = res {
                if e.kind() == ErrorKind::UnexpectedEof {
                    // the file has fewer than count_bytes bytes,
                    // fill buffer with everything in the file
                    file.rewind()?;
                    input.clear();
                    file.read_to_end(&mut input)?;
                } else {
                    return Err(e.into());
                }
            }

            let mut input = converter(&input)?;

            // crop bits - read can only crop on a byte-level
            input.crop(max_length.get());

            run_suite(&input, config, None)
        }
        MaxLengthOrSplit::Split(split_bytes) => {
            let split_bytes = match config.input_format {
                // need 8 bytes of file data for 1 byte of binary data
                InputFormat::Ascii => split_bytes.get() * 8,
                _ => split_bytes.get(),
            };

            let file_size = file.metadata()?.len();
            let count = file_size / (split_bytes as u64);

            let mut passed = true;
            let mut input_bytes = vec![0; split_bytes];

            for current in 1..=count {
                file.read_exact(&mut input_bytes)
                    .context("Failed to read the input file")?;

                let input = converter(&input_bytes)?;
                let parts = Some(Parts { current, count });
                passed &= run_suite(&input, config, parts)?;
            }

            Ok(passed)
        }
        MaxLengthOrSplit::None => {
            let mut input = Vec::new();
            file.read_to_end(&mut input)?;

            let input = converter(&input)?;
            run_suite(&input, config, None)
        }
    }
}

/// Handles input of type ASCII lossy.
///
/// Returns true if all tests passed.
fn handle_ascii_lossy_input(config: &ValidatedConfig) -> anyhow::Result<bool> {
    // have to read everything - necessary length is not determinable
    let input = fs::read_to_string(&config.input_file).context("Failed to open input file")?;

    match config.max_length_or_split {
        MaxLengthOrSplit::MaxLength(max_length) => {
            let input = BitVec::from_ascii_str_lossy_with_max_length(&input, max_length.get());
            run_suite(&input, config, None)
        }
        MaxLengthOrSplit::Split(split_bytes) => {
            let split_bits = split_bytes.get() * 8;
            let full_input = BitVec::from_ascii_str_lossy(&input);
            let count = full_input.len_bit() / split_bits;

            let mut passed = true;
            for idx in 0..count {
                let start = idx * split_bits;
                let input = full_input.slice(start..(start + split_bits));
                let parts = Some(Parts {
                    current: (idx + 1) as u64,
                    count: count as u64,
                });
                passed &= run_suite(&input, config, parts)?;
            }

            Ok(passed)
        }
        MaxLengthOrSplit::None => {
            let input = BitVec::from_ascii_str_lossy(&input);
            run_suite(&input, config, None)
        }
    }
}

/// Run the suite on the given BitVec and report the results.
/// If parts are given, this function behaves as if a file is split into subfiles and tested in
/// the same program execution.
///
/// Returns true if all tests ran and passed, else false.
fn run_suite(
    input: &BitVec,
    config: &ValidatedConfig,
    parts: Option<Parts>,
) -> anyhow::Result<bool> {
    // Create CSV file, if necessary
    let mut csv_file = match config.output_path.as_deref() {
        Some(path) => Some(create_csv_file(path, parts)?),
        None => None,
    };

    if let Some(parts) = parts {
        print!("{} / {} ", parts.current, parts.count);
    }
    println!("Running the test suite on {} bits.", input.len_bit());

    let suite = Suite::new()
        .with_args(config.test_arguments.clone())
        .with_max_bits(config.max_bits)
        .with_observer(LogObserver { parts });

    let result = match config.threads {
        Some(threads) => {
            let runner = MultiThreadedTestRunner::with_threads(threads.get())?;
            debug!("using {} threads", runner.threads());
            suite.with_runner(runner).run_bits(input)
        }
        None => suite.run_bits(input),
    }
    .context("The test suite rejected the input")?;

    if let Some(csv_file) = &mut csv_file {
        for summary in &result.results {
            csv_file.write_summary(summary)?;
        }
    }

    if config.console_output {
        print_report(&result);
    }

    print_aggregates(&result);

    Ok(result.all_passed())
}

/// Print the result of every test.
fn print_report(result: &SuiteResult) {
    for summary in &result.results {
        let status = if summary.is_skipped() {
            "SKIPPED"
        } else if summary.passed {
            "PASSED"
        } else {
            "FAILED"
        };
        let time_as_ms = (summary.elapsed.as_micros() as f64) / 1000.0;

        print!("\t{} ({time_as_ms}ms): {status}", summary.name);
        if !summary.is_skipped() {
            print!(". P-Value: {}", summary.p_value);
        }
        if let Some(proportion) = summary.proportion {
            print!(". Proportion: {proportion:.4}");
        }
        if let Some(warning) = &summary.warning {
            print!(". Comment: {warning}");
        }
        println!();
    }
    println!();
}

/// Print the aggregates of a suite run.
fn print_aggregates(result: &SuiteResult) {
    println!(
        "\tSummary: {} of {} tests run, {} passed, {} skipped. Pass rate: {:.4}",
        result.tests_run,
        result.tests_total,
        result.tests_passed,
        result.tests_skipped,
        result.overall_pass_rate
    );

    if result.p_value_uniformity_chi2 < 0.0 {
        println!("\tP-value uniformity: too few p-values");
    } else {
        println!("\tP-value uniformity: {:.6}", result.p_value_uniformity_chi2);
    }

    if !result.nist_compliant {
        println!("\tNot all tests could be run, the run is not NIST compliant.");
    }
    println!("\tElapsed: {}ms", result.elapsed.as_millis());
    println!();
}

/// Create the [CsvFile] instance for the test output, based on the path and the part (if given).
fn create_csv_file(csv_path: &Path, parts: Option<Parts>) -> anyhow::Result<CsvFile> {
    let file = match parts {
        Some(parts) => {
            if csv_path.file_name().is_none() {
                return Err(anyhow::anyhow!("Given output path contains no file name."));
            }

            if csv_path.try_exists()? && !csv_path.is_file() {
                // path exists, but is no file (i.e. dir)
                return Err(anyhow::anyhow!(
                    "Given output path already exists, but is no file."
                ));
            }

            let max_idx_len = format!("{}", parts.count).len();

            // create one file per part - filename_{idx}.extension
            let file_name = {
                let mut stem = csv_path
                    .file_stem()
                    .map(OsStr::to_os_string)
                    .unwrap_or_default();
                stem.push(format!("_{:0>1$}", parts.current, max_idx_len));
                if let Some(ext) = csv_path.extension() {
                    stem.push(".");
                    stem.push(ext);
                }
                stem
            };

            CsvFile::new(csv_path.with_file_name(file_name))
        }
        None => CsvFile::new(csv_path),
    }
    .context("Failed to create the output file")?;

    Ok(file)
}
