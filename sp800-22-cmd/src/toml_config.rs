//! TOML configuration file.

use crate::{InputFormat, LogLevel};
use serde::{Deserialize, Serialize};
use sp800_22_lib::tests::approximate_entropy::ApproximateEntropyTestArg;
use sp800_22_lib::tests::frequency_block::FrequencyBlockTestArg;
use sp800_22_lib::tests::linear_complexity::LinearComplexityTestArg;
use sp800_22_lib::tests::serial::SerialTestArg;
use sp800_22_lib::tests::template_matching::non_overlapping::NonOverlappingTemplateTestArgs;
use sp800_22_lib::tests::template_matching::overlapping::OverlappingTemplateTestArgs;
use sp800_22_lib::TestArgs;
use std::num::NonZero;
use std::path::PathBuf;

/// Struct for the TOML configuration file, the constraints of CmdArgs are not validated here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct TomlConfig {
    // not really optional, must be supplemented from cmd args if missing.
    pub input: TomlInput,
    pub suite: Option<TomlSuite>,
    pub output: Option<TomlOutput>,
    pub log: Option<TomlLog>,
    // each argument is optional
    pub arguments: Option<TomlTestArguments>,
}

/// Input: file, format, max length, split
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlInput {
    pub input_file: Option<PathBuf>,
    pub input_format: Option<InputFormat>,
    pub max_length: Option<NonZero<usize>>,
    pub split: bool,
}

/// Suite settings: accepted input length and parallelism.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlSuite {
    pub max_bits: Option<NonZero<usize>>,
    pub threads: Option<NonZero<usize>>,
}

/// Output: CSV path and console verbosity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlOutput {
    pub path: Option<PathBuf>,
    pub no_console: bool,
}

/// Logging settings.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlLog {
    pub level: Option<LogLevel>,
}

/// Test arguments for the suite. Also used in cmd line overrides.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct TomlTestArguments {
    pub frequency_block: Option<TomlFrequencyBlockLinearComplexity>,
    pub non_overlapping_template_matching: Option<TomlNonOverlapping>,
    pub overlapping_template_matching: Option<TomlOverlapping>,
    pub linear_complexity: Option<TomlFrequencyBlockLinearComplexity>,
    pub serial: Option<TomlSerialApproximateEntropy>,
    pub approximate_entropy: Option<TomlSerialApproximateEntropy>,
}

impl TryFrom<TomlTestArguments> for TestArgs {
    type Error = &'static str;

    fn try_from(value: TomlTestArguments) -> Result<Self, Self::Error> {
        let TomlTestArguments {
            frequency_block,
            non_overlapping_template_matching,
            overlapping_template_matching,
            linear_complexity,
            serial,
            approximate_entropy,
        } = value;

        let frequency_block = match frequency_block.and_then(|arg| arg.fixed_length()) {
            Some(block_length) => FrequencyBlockTestArg::new(block_length),
            None => FrequencyBlockTestArg::ChooseAutomatically,
        };

        let non_overlapping_template = match non_overlapping_template_matching {
            Some(arg) => {
                use sp800_22_lib::tests::template_matching::non_overlapping::DEFAULT_BLOCK_COUNT;
                use sp800_22_lib::tests::template_matching::DEFAULT_TEMPLATE_LEN;

                let template_length = arg
                    .template_length
                    .map_or(DEFAULT_TEMPLATE_LEN, NonZero::get);
                let count_blocks = arg.count_blocks.map_or(DEFAULT_BLOCK_COUNT, NonZero::get);

                NonOverlappingTemplateTestArgs::new(template_length, count_blocks)
                    .ok_or("Config file: invalid value for non-overlapping-template-matching.")?
            }
            None => Default::default(),
        };

        let overlapping_template = match overlapping_template_matching {
            Some(arg) => {
                use sp800_22_lib::tests::template_matching::overlapping::{
                    DEFAULT_BLOCK_LENGTH, DEFAULT_FREEDOM, DEFAULT_TEMPLATE_LENGTH,
                };

                let template_length = arg
                    .template_length
                    .map_or(DEFAULT_TEMPLATE_LENGTH, NonZero::get);

                if arg.nist_behaviour == Some(true) {
                    if arg.block_length.is_some() || arg.freedom.is_some() {
                        return Err("Config file: nist-behaviour fixes block-length and freedom.");
                    }
                    OverlappingTemplateTestArgs::new_nist_behaviour(template_length).ok_or(
                        "Config file: nist-behaviour needs a template-length of 9 or 10.",
                    )?
                } else {
                    let block_length = arg.block_length.map_or(DEFAULT_BLOCK_LENGTH, NonZero::get);
                    let freedom = arg.freedom.map_or(DEFAULT_FREEDOM, NonZero::get);

                    OverlappingTemplateTestArgs::new(template_length, block_length, freedom)
                        .ok_or("Config file: invalid value for overlapping-template-matching.")?
                }
            }
            None => Default::default(),
        };

        let linear_complexity = match linear_complexity.and_then(|arg| arg.fixed_length()) {
            Some(block_length) => LinearComplexityTestArg::new(block_length),
            None => LinearComplexityTestArg::ChooseAutomatically,
        };

        // no block length: chosen based on the input length
        let serial = match serial {
            Some(TomlSerialApproximateEntropy {
                block_length: Some(block_length),
            }) => Some(
                SerialTestArg::new(block_length.get())
                    .ok_or("Config file: invalid value for serial.block-length")?,
            ),
            _ => None,
        };

        let approximate_entropy = match approximate_entropy {
            Some(TomlSerialApproximateEntropy {
                block_length: Some(block_length),
            }) => ApproximateEntropyTestArg::new(block_length.get())
                .ok_or("Config file: invalid value for approximate-entropy.block-length")?,
            _ => Default::default(),
        };

        Ok(TestArgs {
            frequency_block,
            non_overlapping_template,
            overlapping_template,
            linear_complexity,
            serial,
            approximate_entropy,
        })
    }
}

/// Test argument for the Frequency test within a block and the linear complexity test.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlFrequencyBlockLinearComplexity {
    pub block_length: Option<NonZero<usize>>,
    pub choose_automatically: Option<bool>,
}

impl TomlFrequencyBlockLinearComplexity {
    /// The block length to use, `None` if it is left to the suite.
    fn fixed_length(self) -> Option<NonZero<usize>> {
        match self.choose_automatically {
            Some(true) => None,
            _ => self.block_length,
        }
    }
}

/// Test argument for the non-overlapping template matching test.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlNonOverlapping {
    pub template_length: Option<NonZero<usize>>,
    pub count_blocks: Option<NonZero<usize>>,
}

/// Test argument for the overlapping template matching test. `freedom` is the count of degrees
/// of freedom K, the test uses K + 1 categories. `nist-behaviour` switches to the probabilities
/// of the NIST reference implementation.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlOverlapping {
    pub template_length: Option<NonZero<usize>>,
    pub block_length: Option<NonZero<usize>>,
    pub freedom: Option<NonZero<usize>>,
    pub nist_behaviour: Option<bool>,
}

/// Test argument for the serial test and the approximate entropy test.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlSerialApproximateEntropy {
    pub block_length: Option<NonZero<u8>>,
}
