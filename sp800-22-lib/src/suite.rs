//! The suite orchestrator: validates the input, resolves the parameters, runs all tests through a
//! [TestRunner] and aggregates the results.
//!
//! ```no_run
//! let bytes = std::fs::read("random.bin").unwrap();
//! let result = sp800_22_lib::run(&bytes).unwrap();
//! println!("{} of {} tests passed", result.tests_passed, result.tests_run);
//! ```

use crate::bitvec::BitVec;
use crate::internals::igamc;
use crate::parameters::TestParameters;
use crate::test_runner::{NoopObserver, SingleThreadedTestRunner, SuiteObserver, TestRunner};
use crate::{Error, Test, TestArgs, TestResult, DEFAULT_THRESHOLD, VERSION};
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;

/// The minimum input length in bits, required by Maurer's "Universal Statistical" test.
pub const MIN_BITS: usize = 387_840;

/// The default maximum input length in bits.
pub const DEFAULT_MAX_BITS: usize = 10_000_000;

/// The count of bins for the p-value uniformity check.
const UNIFORMITY_BINS: usize = 10;

/// The minimum count of p-values for the uniformity check.
const UNIFORMITY_MIN_VALUES: usize = 5;

/// The outcome of a single test in the suite.
#[derive(Clone, Debug, PartialEq)]
pub struct TestSummary {
    pub test: Test,
    /// The NIST name of the test.
    pub name: &'static str,
    /// The statistic of the representative result, if the test records one.
    pub statistic: Option<f64>,
    /// The representative p-value in [0, 1], or -1 if the test was skipped.
    ///
    /// For tests with several results: the smaller p-value of the serial and the cumulative sums
    /// test, the state x = +1 (index 4) of the random excursions test, the state x = -1 (index 8)
    /// of the variant, and the first template of the non-overlapping template matching test.
    /// All results are kept in [Self::sub_results].
    pub p_value: f64,
    pub passed: bool,
    /// Share of the (not skipped) sub results that passed, for tests with multiple results.
    pub proportion: Option<f64>,
    /// Why the test was skipped, or a note on the result.
    pub warning: Option<String>,
    /// All raw results of the test, in the order the test produces them.
    pub sub_results: Vec<TestResult>,
    /// The time it took to run the test.
    pub elapsed: Duration,
}

impl TestSummary {
    /// Summarize the raw results of a test. An error turns into a skipped summary, with the
    /// error message as the warning.
    pub fn new(test: Test, results: Result<Vec<TestResult>, Error>, elapsed: Duration) -> Self {
        let results = match results {
            Ok(results) if !results.is_empty() => results,
            Ok(_) => return Self::skipped(test, "The test returned no result.".to_owned(), elapsed),
            Err(e) => return Self::skipped(test, e.to_string(), elapsed),
        };

        let representative = results[representative_index(test, &results)];

        let p_value = if representative.is_skipped() {
            -1.0
        } else {
            representative.p_value().clamp(0.0, 1.0)
        };
        let passed = p_value >= DEFAULT_THRESHOLD;

        let warning = match representative.comment() {
            Some(comment) => Some(comment.to_owned()),
            None if p_value < 0.0 => Some("The test was skipped.".to_owned()),
            None => None,
        };

        let proportion = if results.len() > 1 {
            let (run, passed) = results
                .iter()
                .filter(|result| !result.is_skipped())
                .fold((0_usize, 0_usize), |(run, passed), result| {
                    (run + 1, passed + result.passed(DEFAULT_THRESHOLD) as usize)
                });
            (run > 0).then(|| (passed as f64) / (run as f64))
        } else {
            None
        };

        Self {
            test,
            name: test.name(),
            statistic: representative.statistic(),
            p_value,
            passed,
            proportion,
            warning,
            sub_results: results,
            elapsed,
        }
    }

    fn skipped(test: Test, warning: String, elapsed: Duration) -> Self {
        Self {
            test,
            name: test.name(),
            statistic: None,
            p_value: -1.0,
            passed: false,
            proportion: None,
            warning: Some(warning),
            sub_results: Vec::new(),
            elapsed,
        }
    }

    /// If the test was skipped, see [Self::warning] for the reason.
    pub fn is_skipped(&self) -> bool {
        self.p_value < 0.0
    }
}

/// The result whose p-value represents a test with multiple results.
fn representative_index(test: Test, results: &[TestResult]) -> usize {
    match test {
        // the smaller p-value of both modes
        Test::Serial | Test::CumulativeSums => results
            .iter()
            .enumerate()
            .filter(|(_, result)| !result.is_skipped())
            .min_by(|(_, a), (_, b)| a.p_value().total_cmp(&b.p_value()))
            .map_or(0, |(idx, _)| idx),
        // x = +1
        Test::RandomExcursions if results.len() > 4 => 4,
        // x = -1
        Test::RandomExcursionsVariant if results.len() > 8 => 8,
        // for the non-overlapping template matching test: the first template
        _ => 0,
    }
}

/// The outcome of a whole suite run.
#[derive(Clone, Debug, PartialEq)]
pub struct SuiteResult {
    /// The version of the engine, see [VERSION].
    pub version: &'static str,
    /// The input length in bits.
    pub len_bit: usize,
    /// The parameters all tests ran with.
    pub parameters: TestParameters,
    /// One summary per test, in the canonical order of [Test].
    pub results: Vec<TestSummary>,
    pub tests_total: usize,
    /// Count of tests that were not skipped.
    pub tests_run: usize,
    pub tests_skipped: usize,
    pub tests_passed: usize,
    /// `tests_passed / tests_run`, 0 if no test ran.
    pub overall_pass_rate: f64,
    /// `true` if every test ran.
    pub nist_compliant: bool,
    /// See [p_value_uniformity].
    pub p_value_uniformity_chi2: f64,
    /// Wall-clock time of the whole run.
    pub elapsed: Duration,
}

impl SuiteResult {
    fn new(
        len_bit: usize,
        parameters: TestParameters,
        results: Vec<TestSummary>,
        elapsed: Duration,
    ) -> Self {
        let tests_total = results.len();
        let tests_run = results.iter().filter(|summary| !summary.is_skipped()).count();
        let tests_passed = results.iter().filter(|summary| summary.passed).count();

        let overall_pass_rate = if tests_run > 0 {
            (tests_passed as f64) / (tests_run as f64)
        } else {
            0.0
        };

        let p_values = results
            .iter()
            .map(|summary| summary.p_value)
            .collect::<Vec<_>>();

        Self {
            version: VERSION,
            len_bit,
            parameters,
            tests_total,
            tests_run,
            tests_skipped: tests_total - tests_run,
            tests_passed,
            overall_pass_rate,
            nist_compliant: tests_run == tests_total,
            p_value_uniformity_chi2: p_value_uniformity(&p_values),
            results,
            elapsed,
        }
    }

    /// `true` if every test ran and passed.
    pub fn all_passed(&self) -> bool {
        self.nist_compliant && self.tests_passed == self.tests_total
    }

    /// The summary of the given test.
    pub fn get(&self, test: Test) -> Option<&TestSummary> {
        self.results.iter().find(|summary| summary.test == test)
    }
}

/// Chi-squared goodness-of-fit of the given p-values against the uniform distribution, as
/// p-value: ten equal bins over [0, 1] (1.0 belongs to the last bin), `igamc(9/2, chi^2 / 2)`.
///
/// Negative p-values (skipped tests) are ignored. With fewer than 5 p-values left, -1.0 is
/// returned.
pub fn p_value_uniformity(p_values: &[f64]) -> f64 {
    let p_values = p_values
        .iter()
        .copied()
        .filter(|p| (0.0..=1.0).contains(p))
        .collect::<Vec<_>>();

    if p_values.len() < UNIFORMITY_MIN_VALUES {
        return -1.0;
    }

    let mut bins = [0_usize; UNIFORMITY_BINS];
    for p in &p_values {
        let idx = usize::min((p * UNIFORMITY_BINS as f64) as usize, UNIFORMITY_BINS - 1);
        bins[idx] += 1;
    }

    let expected = (p_values.len() as f64) / (UNIFORMITY_BINS as f64);
    let chi = bins
        .iter()
        .map(|&observed| f64::powi(observed as f64 - expected, 2) / expected)
        .sum::<f64>();

    igamc(((UNIFORMITY_BINS - 1) as f64) / 2.0, chi / 2.0).unwrap_or(-1.0)
}

/// Builder and entry point for a suite run.
///
/// ```
/// use sp800_22_lib::Suite;
/// use sp800_22_lib::test_runner::MultiThreadedTestRunner;
///
/// let suite = Suite::new()
///     .with_max_bits(1_000_000)
///     .with_runner(MultiThreadedTestRunner::with_threads(2).unwrap());
/// assert!(suite.run(&[0xAB; 10]).is_err());
/// ```
pub struct Suite<R = SingleThreadedTestRunner, O = NoopObserver> {
    runner: R,
    observer: O,
    args: TestArgs,
    max_bits: usize,
}

impl Suite {
    /// A suite with the single threaded runner, no observer, default arguments and
    /// [DEFAULT_MAX_BITS].
    pub fn new() -> Self {
        Self {
            runner: SingleThreadedTestRunner,
            observer: NoopObserver,
            args: TestArgs::default(),
            max_bits: DEFAULT_MAX_BITS,
        }
    }
}

impl Default for Suite {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: TestRunner, O: SuiteObserver> Suite<R, O> {
    /// Use another runner.
    pub fn with_runner<R2: TestRunner>(self, runner: R2) -> Suite<R2, O> {
        Suite {
            runner,
            observer: self.observer,
            args: self.args,
            max_bits: self.max_bits,
        }
    }

    /// Use another observer.
    pub fn with_observer<O2: SuiteObserver>(self, observer: O2) -> Suite<R, O2> {
        Suite {
            runner: self.runner,
            observer,
            args: self.args,
            max_bits: self.max_bits,
        }
    }

    /// Override the test arguments.
    pub fn with_args(mut self, args: TestArgs) -> Self {
        self.args = args;
        self
    }

    /// Set the maximum input length in bits.
    pub fn with_max_bits(mut self, max_bits: usize) -> Self {
        self.max_bits = max_bits;
        self
    }

    /// The maximum input length in bits.
    pub fn max_bits(&self) -> usize {
        self.max_bits
    }

    /// The observer of this suite.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Checks the input length, without running anything.
    pub fn validate(&self, len_bit: usize) -> Result<(), Error> {
        if len_bit == 0 {
            Err(Error::Empty)
        } else if len_bit < MIN_BITS {
            Err(Error::TooShort {
                got: len_bit,
                min: MIN_BITS,
            })
        } else if len_bit > self.max_bits {
            Err(Error::TooLong {
                got: len_bit,
                max: self.max_bits,
            })
        } else {
            Ok(())
        }
    }

    /// Run all tests on the given bytes, 8 bits per byte, MSB first.
    pub fn run(&self, bytes: &[u8]) -> Result<SuiteResult, Error> {
        self.run_bits(&BitVec::from_bytes(bytes))
    }

    /// Run all tests on the given bits.
    pub fn run_bits(&self, data: &BitVec) -> Result<SuiteResult, Error> {
        let len_bit = data.len_bit();
        self.validate(len_bit)?;

        let start = Instant::now();
        let parameters = TestParameters::resolve(len_bit, &self.args);
        let tests = Test::iter().collect::<Vec<_>>();

        let results = self
            .runner
            .run_tests(&tests, data, &parameters, &self.observer)?;

        Ok(SuiteResult::new(len_bit, parameters, results, start.elapsed()))
    }
}

/// Run all tests on the given bytes with the default [Suite].
pub fn run(bytes: &[u8]) -> Result<SuiteResult, Error> {
    Suite::new().run(bytes)
}
