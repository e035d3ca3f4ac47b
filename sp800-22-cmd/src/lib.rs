//! The command line front end of the SP 800-22 test suite.

use clap::ValueEnum;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub mod cmd_args;
pub mod csv;
pub mod toml_config;
pub mod valid_arg;


/// The input file formats that can be specified. Used both for command line arguments and TOML.
#[derive(Copy, Clone, Debug, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputFormat {
    /// Binary input, 8 bits per byte, MSB first.
    Binary,
    /// Input is an ASCII text file consisting of only '0' or '1'.
    Ascii,
    /// Input is an ASCII text file consisting of any character. Characters other than '0' or '1'
    /// are skipped.
    AsciiLossy,
}

/// The log levels that can be specified. Used for command line arguments, the environment
/// and TOML.
#[derive(Copy, Clone, Debug, Default, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }
}
