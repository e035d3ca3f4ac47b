#![doc = include_str!("../README.md")]

use crate::tests::approximate_entropy::ApproximateEntropyTestArg;
use crate::tests::frequency_block::FrequencyBlockTestArg;
use crate::tests::linear_complexity::LinearComplexityTestArg;
use crate::tests::serial::SerialTestArg;
use crate::tests::template_matching::non_overlapping::NonOverlappingTemplateTestArgs;
use crate::tests::template_matching::overlapping::OverlappingTemplateTestArgs;
use std::num::NonZero;
use strum::{Display, EnumIter};
use thiserror::Error;

// internal usage only
pub(crate) mod internals;

// public exports
pub mod bitvec;
pub mod parameters;
pub mod suite;
pub mod test_runner;

pub use strum::IntoEnumIterator;
pub use suite::{run, Suite, SuiteResult, TestSummary};

/// The version of the test engine, reported in every [SuiteResult].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The significance level alpha: a test passes if its p-value is greater or equal.
pub const DEFAULT_THRESHOLD: f64 = 0.01;

/// List of all tests, in the canonical order used for every [SuiteResult].
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, EnumIter, Display)]
#[repr(u8)]
pub enum Test {
    /// See [tests::frequency].
    Frequency = 0,
    /// See [tests::frequency_block].
    FrequencyWithinABlock = 1,
    /// See [tests::runs].
    Runs = 2,
    /// See [tests::longest_run_of_ones].
    LongestRunOfOnes = 3,
    /// See [tests::binary_matrix_rank].
    BinaryMatrixRank = 4,
    /// See [tests::spectral_dft].
    SpectralDft = 5,
    /// See [tests::template_matching::non_overlapping].
    NonOverlappingTemplateMatching = 6,
    /// See [tests::template_matching::overlapping].
    OverlappingTemplateMatching = 7,
    /// See [tests::maurers_universal_statistical]
    MaurersUniversalStatistical = 8,
    /// See [tests::linear_complexity]
    LinearComplexity = 9,
    /// See [tests::serial]
    Serial = 10,
    /// See [tests::approximate_entropy]
    ApproximateEntropy = 11,
    /// See [tests::cumulative_sums]
    CumulativeSums = 12,
    /// See [tests::random_excursions]
    RandomExcursions = 13,
    /// See [tests::random_excursions_variant]
    RandomExcursionsVariant = 14,
}

impl Test {
    /// Count of tests in the suite.
    pub const COUNT: usize = 15;

    /// The name of the test, as used in NIST SP 800-22.
    pub fn name(self) -> &'static str {
        const NAMES: [&str; Test::COUNT] = [
            "Frequency (Monobit) Test",
            "Frequency Test within a Block",
            "Runs Test",
            "Test for the Longest Run of Ones in a Block",
            "Binary Matrix Rank Test",
            "Discrete Fourier Transform (Spectral) Test",
            "Non-overlapping Template Matching Test",
            "Overlapping Template Matching Test",
            "Maurer's \"Universal Statistical\" Test",
            "Linear Complexity Test",
            "Serial Test",
            "Approximate Entropy Test",
            "Cumulative Sums (Cusum) Test",
            "Random Excursions Test",
            "Random Excursions Variant Test",
        ];

        NAMES[(self as u8) as usize]
    }
}

/// Test argument overrides for the [parameter resolver](parameters::TestParameters).
/// Every argument defaults to the value NIST recommends for the input length.
///
/// You can construct an instance, leaving all other arguments as the default, like this:
/// ```
/// use std::num::NonZero;
/// use sp800_22_lib::TestArgs;
/// use sp800_22_lib::tests::frequency_block::FrequencyBlockTestArg;
/// let args = TestArgs {
///     frequency_block: FrequencyBlockTestArg::Bitwise(NonZero::new(23).unwrap()),
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestArgs {
    pub frequency_block: FrequencyBlockTestArg,
    pub non_overlapping_template: NonOverlappingTemplateTestArgs,
    pub overlapping_template: OverlappingTemplateTestArgs,
    pub linear_complexity: LinearComplexityTestArg,
    /// `None` chooses the block length based on the input length.
    pub serial: Option<SerialTestArg>,
    pub approximate_entropy: ApproximateEntropyTestArg,
}

/// The common test result type, as used by all tests.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TestResult {
    p_value: f64,
    statistic: Option<f64>,
    comment: Option<&'static str>,
}

// private methods
impl TestResult {
    /// A new test result without comment.
    pub(crate) fn new(p_value: f64) -> Self {
        Self {
            p_value,
            statistic: None,
            comment: None,
        }
    }

    /// A new test result with a comment.
    pub(crate) fn new_with_comment(p_value: f64, comment: &'static str) -> Self {
        Self {
            p_value,
            statistic: None,
            comment: Some(comment),
        }
    }

    /// A result for a test that could not be computed, e.g. because of a too short input.
    pub(crate) fn skipped(comment: &'static str) -> Self {
        Self::new_with_comment(-1.0, comment)
    }

    /// Attach the test statistic the p-value was computed from.
    pub(crate) fn with_statistic(mut self, statistic: f64) -> Self {
        self.statistic = Some(statistic);
        self
    }
}

// public methods
impl TestResult {
    /// The p_value (result of the test). A negative value means the test was skipped.
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// The statistic the p-value was derived from, if the test records one.
    pub fn statistic(&self) -> Option<f64> {
        self.statistic
    }

    /// To determine if the test passed, based on the given threshold:
    /// The test passes if the [p_value](Self::p_value) is greater or equal to the given
    /// threshold. A skipped test never passes.
    pub fn passed(&self, threshold: f64) -> bool {
        !self.is_skipped() && self.p_value >= threshold
    }

    /// If the test was skipped, see [Self::comment] for the reason.
    pub fn is_skipped(&self) -> bool {
        self.p_value < 0.0
    }

    /// Some tests leave a comment about the outcome.
    pub fn comment(&self) -> Option<&'static str> {
        self.comment
    }
}

/// The error type for all tests and the suite.
#[derive(Error, Debug)]
pub enum Error {
    /// A numeric overflow happened. The String gives further information on where exactly.
    #[error("Overflow in {0}.")]
    Overflow(String),
    #[error("Result is not a number.")]
    NaN,
    #[error("Result is infinite.")]
    Infinite,
    #[error(transparent)]
    GammaFunctionFailed(#[from] statrs::StatsError),
    #[error("Invalid Parameter: {0}")]
    InvalidParameter(String),
    /// A special function was called outside its domain.
    #[error("Domain error: {0}")]
    Domain(String),
    #[error("bitstream cannot be empty")]
    Empty,
    #[error("insufficient bits: got {got}, need at least {min} ({} bytes)", min / 8)]
    TooShort { got: usize, min: usize },
    #[error("too many bits: got {got}, maximum {max} ({} bytes)", max / 8)]
    TooLong { got: usize, max: usize },
    #[error("the test run was cancelled")]
    Cancelled,
    #[error("Failed to create the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Returns the minimum input length, in bits, for the specified test.
pub fn get_min_length_for_test(test: Test) -> NonZero<usize> {
    use crate::tests;

    const MIN_LENGTHS: [NonZero<usize>; Test::COUNT] = [
        tests::frequency::MIN_INPUT_LENGTH,
        tests::frequency_block::MIN_INPUT_LENGTH,
        tests::runs::MIN_INPUT_LENGTH,
        tests::longest_run_of_ones::MIN_INPUT_LENGTH,
        tests::binary_matrix_rank::MIN_INPUT_LENGTH,
        tests::spectral_dft::MIN_INPUT_LENGTH,
        tests::template_matching::non_overlapping::MIN_INPUT_LENGTH,
        tests::template_matching::overlapping::MIN_INPUT_LENGTH,
        tests::maurers_universal_statistical::MIN_INPUT_LENGTH,
        tests::linear_complexity::MIN_INPUT_LENGTH,
        tests::serial::MIN_INPUT_LENGTH,
        tests::approximate_entropy::MIN_INPUT_LENGTH,
        tests::cumulative_sums::MIN_INPUT_LENGTH,
        tests::random_excursions::MIN_INPUT_LENGTH,
        tests::random_excursions_variant::MIN_INPUT_LENGTH,
    ];

    // use the assigned test primitive value as an index
    MIN_LENGTHS[(test as u8) as usize]
}
