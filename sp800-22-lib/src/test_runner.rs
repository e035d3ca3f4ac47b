//! The test runner types to run a list of tests, and the observer interface to follow a run.
//!
//! All runners return the same summaries in the order of the passed tests, they only differ in
//! how the tests are scheduled.

use crate::bitvec::BitVec;
use crate::parameters::TestParameters;
use crate::suite::TestSummary;
use crate::tests::longest_run_of_ones::longest_run_of_ones_test_with_block_length;
use crate::tests::maurers_universal_statistical::maurers_universal_statistical_test_with_arg;
use crate::tests::*;
use crate::{Error, Test, TestResult};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::Instant;

/// Callbacks to follow a suite run. All methods have empty default implementations.
///
/// The callbacks may be called from multiple threads at once, depending on the runner.
pub trait SuiteObserver: Sync {
    /// Called right before the test starts.
    fn test_started(&self, _test: Test) {}

    /// Called after the test finished, with its summary (including the duration).
    fn test_finished(&self, _summary: &TestSummary) {}

    /// Polled before each test. If `true` is returned, the run stops with [Error::Cancelled].
    fn cancelled(&self) -> bool {
        false
    }
}

/// An observer that ignores everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopObserver;

impl SuiteObserver for NoopObserver {}

/// Trait for a test runner, which schedules the given tests.
pub trait TestRunner {
    /// Runs the given tests with the resolved parameters.
    ///
    /// The summaries are returned in the order of `tests`. Errors of single tests are part of
    /// their summary, only a cancellation aborts the whole run.
    fn run_tests(
        &self,
        tests: &[Test],
        data: &BitVec,
        parameters: &TestParameters,
        observer: &dyn SuiteObserver,
    ) -> Result<Vec<TestSummary>, Error>;
}

/// Single threaded implementation of a test runner: runs one test after another.
///
/// Tests with internal parallelism still use the global rayon pool.
#[derive(Copy, Clone, Debug, Default)]
pub struct SingleThreadedTestRunner;

impl SingleThreadedTestRunner {
    /// Create a new instance of the runner.
    pub fn new() -> Self {
        Self
    }
}

impl TestRunner for SingleThreadedTestRunner {
    fn run_tests(
        &self,
        tests: &[Test],
        data: &BitVec,
        parameters: &TestParameters,
        observer: &dyn SuiteObserver,
    ) -> Result<Vec<TestSummary>, Error> {
        tests
            .iter()
            .map(|&test| run_observed(test, data, parameters, observer))
            .collect()
    }
}

/// Implementation of a test runner that runs all tests in parallel, on its own thread pool.
pub struct MultiThreadedTestRunner {
    pool: ThreadPool,
}

impl MultiThreadedTestRunner {
    /// Create a new instance of the runner, with one thread per CPU.
    pub fn new() -> Result<Self, Error> {
        Self::with_threads(num_cpus::get())
    }

    /// Create a new instance of the runner, with the given count of threads.
    pub fn with_threads(threads: usize) -> Result<Self, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("sp800-22-{idx}"))
            .build()?;

        Ok(Self { pool })
    }

    /// The count of threads in the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl TestRunner for MultiThreadedTestRunner {
    fn run_tests(
        &self,
        tests: &[Test],
        data: &BitVec,
        parameters: &TestParameters,
        observer: &dyn SuiteObserver,
    ) -> Result<Vec<TestSummary>, Error> {
        self.pool.install(|| {
            tests
                .par_iter()
                .map(|&test| run_observed(test, data, parameters, observer))
                .collect()
        })
    }
}

/// Run a single test with the observer callbacks, used by all runners.
fn run_observed(
    test: Test,
    data: &BitVec,
    parameters: &TestParameters,
    observer: &dyn SuiteObserver,
) -> Result<TestSummary, Error> {
    if observer.cancelled() {
        return Err(Error::Cancelled);
    }

    observer.test_started(test);
    let start = Instant::now();
    let results = run_test(test, data, parameters);
    let summary = TestSummary::new(test, results, start.elapsed());
    observer.test_finished(&summary);

    Ok(summary)
}

/// Runs a single test with the resolved parameters and returns all of its raw results.
///
/// Tests with a single result return a list with one element.
pub fn run_test(
    test: Test,
    data: &BitVec,
    parameters: &TestParameters,
) -> Result<Vec<TestResult>, Error> {
    let single = |result: Result<TestResult, Error>| result.map(|result| vec![result]);

    match test {
        Test::Frequency => single(frequency::frequency_test(data)),
        Test::FrequencyWithinABlock => single(frequency_block::frequency_block_test(
            data,
            parameters.frequency_block_length,
        )),
        Test::Runs => single(runs::runs_test(data)),
        Test::LongestRunOfOnes => single(match parameters.longest_run {
            Some(block_length) => longest_run_of_ones_test_with_block_length(data, block_length),
            None => Ok(TestResult::skipped(longest_run_of_ones::TOO_SHORT)),
        }),
        Test::BinaryMatrixRank => single(binary_matrix_rank::binary_matrix_rank_test(data)),
        Test::SpectralDft => single(spectral_dft::spectral_dft_test(data)),
        Test::NonOverlappingTemplateMatching => {
            template_matching::non_overlapping::non_overlapping_template_matching_test(
                data,
                &parameters.non_overlapping_template,
            )
        }
        Test::OverlappingTemplateMatching => single(
            template_matching::overlapping::overlapping_template_matching_test(
                data,
                parameters.overlapping_template,
            ),
        ),
        Test::MaurersUniversalStatistical => single(match parameters.universal {
            Some(arg) => maurers_universal_statistical_test_with_arg(data, arg),
            None => Ok(TestResult::skipped(maurers_universal_statistical::TOO_SHORT)),
        }),
        Test::LinearComplexity => single(linear_complexity::linear_complexity_test(
            data,
            parameters.linear_complexity_block_length,
        )),
        Test::Serial => match parameters.serial {
            Some(arg) => serial::serial_test(data, arg).map(Vec::from),
            None => Ok(vec![
                TestResult::skipped(
                    "The input sequence is too short for the serial test."
                );
                2
            ]),
        },
        Test::ApproximateEntropy => single(approximate_entropy::approximate_entropy_test(
            data,
            parameters.approximate_entropy,
        )),
        Test::CumulativeSums => cumulative_sums::cumulative_sums_test(data).map(Vec::from),
        Test::RandomExcursions => random_excursions::random_excursions_test(data),
        Test::RandomExcursionsVariant => {
            random_excursions_variant::random_excursions_variant_test(data)
        }
    }
}
