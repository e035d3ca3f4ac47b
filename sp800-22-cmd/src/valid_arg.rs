//! Struct and conversion method for a validated arg.

use crate::cmd_args::RegularArgs;
use crate::toml_config::{
    TomlConfig, TomlFrequencyBlockLinearComplexity, TomlInput, TomlLog, TomlNonOverlapping,
    TomlOutput, TomlOverlapping, TomlSerialApproximateEntropy, TomlSuite, TomlTestArguments,
};
use crate::{InputFormat, LogLevel};
use sp800_22_lib::suite::DEFAULT_MAX_BITS;
use sp800_22_lib::TestArgs;
use std::num::NonZero;
use std::path::PathBuf;

/// To represent the max_length value and split flag combination
#[derive(Debug, Clone, PartialEq)]
pub enum MaxLengthOrSplit {
    /// A max length was given, unit is bits.
    MaxLength(NonZero<usize>),
    /// A split length was given, unit is bytes.
    Split(NonZero<usize>),
    /// Neither a max length nor a split length was given.
    None,
}

/// A validated config with a valid state that can be used to run the suite.
#[derive(Clone, Debug)]
pub struct ValidatedConfig {
    /// Path to the input file (random data)
    pub input_file: PathBuf,
    /// Input format
    pub input_format: InputFormat,
    /// See [MaxLengthOrSplit]
    pub max_length_or_split: MaxLengthOrSplit,
    /// Finished test arguments
    pub test_arguments: TestArgs,
    /// The maximum count of bits the suite accepts.
    pub max_bits: usize,
    /// Thread count of the parallel runner. `None` runs the tests one after another.
    pub threads: Option<NonZero<usize>>,
    /// An optional path to save the outputs to.
    pub output_path: Option<PathBuf>,
    /// Write console output about individual tests, else only summaries.
    pub console_output: bool,
    pub log_level: LogLevel,
}

impl ValidatedConfig {
    /// Creates a valid config from the command line arguments alone.
    pub fn try_from_cmd_args(args: RegularArgs) -> Result<Self, &'static str> {
        Self::try_from_toml(TomlConfig::default(), args)
    }

    /// Creates a valid config from the specified toml configuration, uses overrides from the
    /// command line. Command line switches (and the environment) take precedence.
    pub fn try_from_toml(toml: TomlConfig, args: RegularArgs) -> Result<Self, &'static str> {
        let TomlConfig {
            input:
                TomlInput {
                    input_file,
                    input_format,
                    max_length,
                    split,
                },
            suite,
            output,
            log,
            arguments,
        } = toml;

        let TomlSuite { max_bits, threads } = suite.unwrap_or_default();
        let TomlOutput {
            path: output_path,
            no_console,
        } = output.unwrap_or_default();
        let TomlLog { level } = log.unwrap_or_default();

        let RegularArgs {
            input_file: args_input_file,
            input_format: args_input_format,
            max_length: args_max_length,
            split: args_split,
            max_bits: args_max_bits,
            threads: args_threads,
            output_path: args_output_path,
            overrides,
            no_console: args_no_console,
            log_level: args_log_level,
        } = args;

        // cmd args overwrite everywhere
        let input_file = args_input_file
            .or(input_file)
            .ok_or("The input file is unspecified in the config file and the cmd args!")?;
        let input_format = args_input_format
            .or(input_format)
            .ok_or("The input format is unspecified in the config file and the cmd args!")?;
        let max_length = args_max_length.or(max_length);
        let split = args_split || split;
        let max_bits = args_max_bits
            .or(max_bits)
            .map_or(DEFAULT_MAX_BITS, NonZero::get);
        let threads = args_threads.or(threads);
        let output_path = args_output_path.or(output_path);
        let console_output = !(args_no_console || no_console);
        let log_level = args_log_level.or(level).unwrap_or_default();

        let test_arguments: TestArgs = match (arguments, parse_overrides(overrides)) {
            (Some(toml_args), Some(overrides)) => {
                toml_args.overlay(overrides?).try_into()?
            }
            (Some(toml_args), None) => toml_args.try_into()?,
            (None, Some(overrides)) => overrides?.try_into()?,
            (None, None) => TestArgs::default(),
        };

        let max_length_or_split = handle_split(split, max_length)?;

        Ok(Self {
            input_file,
            input_format,
            max_length_or_split,
            test_arguments,
            max_bits,
            threads,
            output_path,
            console_output,
            log_level,
        })
    }
}

/// Joins the `--overrides` snippets and parses them as the `[arguments]` table.
fn parse_overrides(
    overrides: Option<Vec<String>>,
) -> Option<Result<TomlTestArguments, &'static str>> {
    let overrides = overrides?.join("\n");

    Some(toml::from_str(&overrides).map_err(|_| "argument overrides is not valid TOML"))
}

/// Lays the fields that are set in `overrides` over `self`.
trait Overlay: Sized {
    fn overlay(self, overrides: Self) -> Self;
}

/// Overlays two optional tables: a table present on only one side is taken as is.
fn overlay_table<T: Overlay>(base: Option<T>, overrides: Option<T>) -> Option<T> {
    match (base, overrides) {
        (Some(base), Some(overrides)) => Some(base.overlay(overrides)),
        (base, overrides) => overrides.or(base),
    }
}

impl Overlay for TomlTestArguments {
    fn overlay(self, overrides: Self) -> Self {
        Self {
            frequency_block: overlay_table(self.frequency_block, overrides.frequency_block),
            non_overlapping_template_matching: overlay_table(
                self.non_overlapping_template_matching,
                overrides.non_overlapping_template_matching,
            ),
            overlapping_template_matching: overlay_table(
                self.overlapping_template_matching,
                overrides.overlapping_template_matching,
            ),
            linear_complexity: overlay_table(self.linear_complexity, overrides.linear_complexity),
            serial: overlay_table(self.serial, overrides.serial),
            approximate_entropy: overlay_table(
                self.approximate_entropy,
                overrides.approximate_entropy,
            ),
        }
    }
}

impl Overlay for TomlFrequencyBlockLinearComplexity {
    fn overlay(self, overrides: Self) -> Self {
        Self {
            block_length: overrides.block_length.or(self.block_length),
            choose_automatically: overrides.choose_automatically.or(self.choose_automatically),
        }
    }
}

impl Overlay for TomlNonOverlapping {
    fn overlay(self, overrides: Self) -> Self {
        Self {
            template_length: overrides.template_length.or(self.template_length),
            count_blocks: overrides.count_blocks.or(self.count_blocks),
        }
    }
}

impl Overlay for TomlOverlapping {
    fn overlay(self, overrides: Self) -> Self {
        Self {
            template_length: overrides.template_length.or(self.template_length),
            block_length: overrides.block_length.or(self.block_length),
            freedom: overrides.freedom.or(self.freedom),
            nist_behaviour: overrides.nist_behaviour.or(self.nist_behaviour),
        }
    }
}

impl Overlay for TomlSerialApproximateEntropy {
    fn overlay(self, overrides: Self) -> Self {
        Self {
            block_length: overrides.block_length.or(self.block_length),
        }
    }
}

/// Handle the split flag, in combination with max_length
pub(crate) fn handle_split(
    split: bool,
    max_length: Option<NonZero<usize>>,
) -> Result<MaxLengthOrSplit, &'static str> {
    if !split {
        return Ok(match max_length {
            None => MaxLengthOrSplit::None,
            Some(max_length) => MaxLengthOrSplit::MaxLength(max_length),
        });
    }

    let Some(max_length) = max_length else {
        return Err("split requires max_length to be set");
    };

    if max_length.get() % 8 != 0 {
        return Err("max_length must denote full bytes (be divisible by 8)");
    }

    NonZero::new(max_length.get() / 8)
        .map(MaxLengthOrSplit::Split)
        .ok_or("max_length must be at least 8 bits to split")
}
