//! Checks that a test work using the example inputs shown in the description of the tests
//! by NIST (section 2 of SP 800-22 Rev. 1a).
//!
//! Some examples use parameters outside the recommended ranges, these call the unchecked
//! internal variants of the tests.

use super::{assert_f64_eq, e_1e6};
use crate::bitvec::BitVec;
use crate::tests::approximate_entropy::{
    approximate_entropy_test, approximate_entropy_test_unchecked, ApproximateEntropyTestArg,
};
use crate::tests::binary_matrix_rank::binary_matrix_rank_test;
use crate::tests::cumulative_sums::{cumulative_sums_test, cusum_test_internal};
use crate::tests::frequency::frequency_test;
use crate::tests::frequency_block::frequency_block_test;
use crate::tests::linear_complexity::{linear_complexity_test, DEFAULT_BLOCK_LENGTH};
use crate::tests::longest_run_of_ones::longest_run_of_ones_test;
use crate::tests::maurers_universal_statistical::{
    maurers_universal_statistical_test, maurers_universal_statistical_test_with_arg,
    UniversalTestArg,
};
use crate::tests::random_excursions::{random_excursions_test, random_excursions_test_internal};
use crate::tests::random_excursions_variant::{
    random_excursions_variant_test, random_excursions_variant_test_internal,
};
use crate::tests::runs::runs_test;
use crate::tests::serial::serial_test_unchecked;
use crate::tests::spectral_dft::spectral_dft_test;
use crate::tests::template_matching::non_overlapping::{
    non_overlapping_template_matching_test, NonOverlappingTemplateTestArgs,
};
use crate::tests::template_matching::overlapping::{
    overlapping_template_matching_test, OverlappingTemplateTestArgs,
};
use crate::tests::template_matching::TemplateArg;
use crate::{Error, DEFAULT_THRESHOLD};

/// The 100 bit example input: the first 100 bits of pi in binary (11.001001000011111...).
const PI_100: &str = "1100100100001111110110101010001000100001011010001100001000110100110001001100011001100010100010111000";

/// Check the test result: Assert that it is OK and print the error if it is not.
fn result_checker<T>(output: &Result<T, Error>) {
    if let Err(e) = output {
        println!("Error: {e}")
    }
    assert!(output.is_ok())
}

/// Test the frequency test (no. 1) - input and expected output from 2.1.4
#[test]
fn test_frequency_test_1() {
    let input = BitVec::from_ascii_str("1011010101").unwrap();

    let output = frequency_test(&input);
    result_checker(&output);

    let output = output.unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.527089);
}

/// Test the frequency test (no.1) - input and expected output from 2.1.8
#[test]
fn test_frequency_test_2() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    let output = frequency_test(&input).unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.109599);
}

/// Test the frequency within a block test (no. 2) - input and expected output from 2.2.4
#[test]
fn test_frequency_block_test_1() {
    let input = BitVec::from_ascii_str("0110011010").unwrap();

    let output = frequency_block_test(&input, 3);
    result_checker(&output);

    let output = output.unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.801252);
    assert_f64_eq!(output.statistic().unwrap(), 1.0);
}

/// Test the frequency within a block test (no. 2) - input and expected output from 2.2.8
#[test]
fn test_frequency_block_test_2() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    let output = frequency_block_test(&input, 10).unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.706438);
}

/// A block length of zero is an invalid argument.
#[test]
fn test_frequency_block_test_zero_block_length() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    assert!(matches!(
        frequency_block_test(&input, 0),
        Err(Error::InvalidParameter(_))
    ));
}

/// Test the runs test (no. 3) - input and expected output from 2.3.4
#[test]
fn test_runs_test_1() {
    let input = BitVec::from_ascii_str("1001101011").unwrap();

    let output = runs_test(&input);
    result_checker(&output);

    let output = output.unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.147232);
    assert_f64_eq!(output.statistic().unwrap(), 7.0);
}

/// Test the runs test (no. 3) - input and expected output from 2.3.8
#[test]
fn test_runs_test_2() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    let output = runs_test(&input).unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.500798);
}

/// The runs test is not run if the frequency precondition fails.
#[test]
fn test_runs_test_precondition() {
    let input = BitVec::from_ascii_str(&"1".repeat(100)).unwrap();

    let output = runs_test(&input).unwrap();
    assert!(!output.passed(DEFAULT_THRESHOLD));
    assert!(!output.is_skipped());
    assert_f64_eq!(output.p_value(), 0.0);
    assert!(output.comment().is_some());
}

/// Test the longest run of ones test (no. 4) - input and expected output from 2.4.8
#[test]
fn test_longest_run_of_ones() {
    let input = BitVec::from_ascii_str("11001100000101010110110001001100111000000000001001001101010100010001001111010110100000001101011111001100111001101101100010110010")
        .unwrap();

    let output = longest_run_of_ones_test(&input);
    result_checker(&output);

    let output = output.unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.180609);
}

/// The longest run of ones test needs at least 128 bits.
#[test]
fn test_longest_run_of_ones_too_short() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    let output = longest_run_of_ones_test(&input).unwrap();
    assert!(output.is_skipped());
    assert!(!output.passed(DEFAULT_THRESHOLD));
}

/// Test the spectral DFT test (no. 6) - input and expected output from 2.6.4
#[test]
fn test_spectral_dft_1() {
    let input = BitVec::from_ascii_str("1001010011").unwrap();

    let output = spectral_dft_test(&input);
    result_checker(&output);

    let output = output.unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.468160);
}

/// Test the spectral DFT test (no. 6) - input and expected output from 2.6.8
#[test]
fn test_spectral_dft_2() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    let output = spectral_dft_test(&input).unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.646355);
}

/// Test the non-overlapping template matching test (no. 7) - input and expected output from 2.7.4
#[test]
fn test_non_overlapping_template_matching() {
    let input = BitVec::from_ascii_str("10100100101110010110").unwrap();

    let templates = TemplateArg::new_with_custom_templates(vec![0b001], 3).unwrap();
    let args = NonOverlappingTemplateTestArgs::new_with_custom_template(templates, 2).unwrap();

    let output = non_overlapping_template_matching_test(&input, &args);
    result_checker(&output);

    let output = output.unwrap();
    assert_eq!(output.len(), 1);
    assert!(output[0].passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output[0].p_value(), 0.344154);
    assert_f64_eq!(output[0].statistic().unwrap(), 2.133333);
}

/// A block shorter than the template skips the test.
#[test]
fn test_non_overlapping_template_matching_too_short() {
    let input = BitVec::from_ascii_str("1010010010").unwrap();
    let args = NonOverlappingTemplateTestArgs::default();

    let output = non_overlapping_template_matching_test(&input, &args).unwrap();
    assert!(output.iter().all(|result| result.is_skipped()));
}

/// Test the statistic of Maurer's universal statistical test (no. 9) - input and expected
/// output from 2.9.4. The p-value in the example is computed without the correction factor c,
/// so only the statistic is compared.
#[test]
fn test_maurers_universal_statistical_statistic() {
    let input = BitVec::from_ascii_str("01011010011101010111").unwrap();

    let output = maurers_universal_statistical_test_with_arg(
        &input,
        UniversalTestArg::new_unchecked(2, 4),
    );
    result_checker(&output);

    assert_f64_eq!(output.unwrap().statistic().unwrap(), 1.1949875);
}

/// The block length of Maurer's test is chosen based on the input length.
#[test]
fn test_maurers_universal_statistical_arg() {
    assert_eq!(UniversalTestArg::for_length(387_839), None);

    let arg = UniversalTestArg::for_length(387_840).unwrap();
    assert_eq!(arg.block_length(), 6);
    assert_eq!(arg.init_blocks(), 640);

    let arg = UniversalTestArg::for_length(1_000_000).unwrap();
    assert_eq!(arg.block_length(), 7);
    assert_eq!(arg.init_blocks(), 1280);
}

/// Test the serial test (no. 11) - input and expected output from 2.11.4
#[test]
fn test_serial_test() {
    let input = BitVec::from_ascii_str("0011011101").unwrap();

    let output = serial_test_unchecked(&input, 3);
    result_checker(&output);

    let output = output.unwrap();
    assert!(output[0].passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output[0].p_value(), 0.808792);
    assert!(output[1].passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output[1].p_value(), 0.670320);
}

/// Test the approximate entropy test (no. 12) - input and expected output from 2.12.4
#[test]
fn test_approximate_entropy_test_1() {
    let input = BitVec::from_ascii_str("0100110101").unwrap();

    let output = approximate_entropy_test_unchecked(&input, 3);
    result_checker(&output);

    let output = output.unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.261961);
}

/// Test the approximate entropy test (no. 12) - input and expected output from 2.12.8
#[test]
fn test_approximate_entropy_test_2() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    let output = approximate_entropy_test_unchecked(&input, 2).unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.235301);
}

/// Test the cumulative sums test (no. 13) - input and expected output from 2.13.4
#[test]
fn test_cumulative_sums_test_1() {
    let input = BitVec::from_ascii_str("1011010111").unwrap();

    let output = cusum_test_internal(&input, false);
    result_checker(&output);

    let output = output.unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.411659);
    assert_f64_eq!(output.statistic().unwrap(), 4.0);
}

/// Test the cumulative sums test (no. 13) - input and expected output from 2.13.8
#[test]
fn test_cumulative_sums_test_2() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    let output = cumulative_sums_test(&input).unwrap();
    assert_f64_eq!(output[0].p_value(), 0.219194);
    assert_f64_eq!(output[1].p_value(), 0.114866);
}

/// Test the random excursions test (no. 14) - input and expected output from 2.14.4.
/// The input is far too short for the required count of cycles, so no minimum is enforced.
#[test]
fn test_random_excursions_test() {
    let input = BitVec::from_ascii_str("0110110101").unwrap();

    let output = random_excursions_test_internal(&input, 0);
    result_checker(&output);

    let output = output.unwrap();
    assert_eq!(output.len(), 8);
    // x = +1
    assert!(output[4].passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output[4].p_value(), 0.502488);
}

/// With too few cycles, all results of the random excursions test are skipped.
#[test]
fn test_random_excursions_test_too_few_cycles() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    let output = crate::tests::random_excursions::random_excursions_test(&input).unwrap();
    assert_eq!(output.len(), 8);
    assert!(output.iter().all(|result| result.is_skipped()));
}

/// Test the random excursions variant test (no. 15) - input and expected output from 2.15.4.
#[test]
fn test_random_excursions_variant_test() {
    let input = BitVec::from_ascii_str("0110110101").unwrap();

    let output = random_excursions_variant_test_internal(&input, 0);
    result_checker(&output);

    let output = output.unwrap();
    assert_eq!(output.len(), 18);
    // x = +1
    assert!(output[9].passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output[9].p_value(), 0.683091);
    assert_f64_eq!(output[9].statistic().unwrap(), 4.0);
}

/// With too few cycles, all results of the random excursions variant test are skipped.
#[test]
fn test_random_excursions_variant_test_too_few_cycles() {
    let input = BitVec::from_ascii_str(PI_100).unwrap();

    let output =
        crate::tests::random_excursions_variant::random_excursions_variant_test(&input).unwrap();
    assert_eq!(output.len(), 18);
    assert!(output.iter().all(|result| result.is_skipped()));
}

// The following tests use the first 10^6 bits of e, the expected values are the ones listed in
// Appendix B of SP 800-22 (computed by the NIST reference implementation).

/// Frequency test on e, Appendix B.
#[test]
fn test_frequency_test_e() {
    let output = frequency_test(e_1e6()).unwrap();
    assert_f64_eq!(output.p_value(), 0.953749);
}

/// Binary matrix rank test on e, for 10^5 bits as in 2.5.8 and for all 10^6 bits.
///
/// The intermediate values printed in 2.5.8 do not add up to its chi^2, the p-value is the one
/// of the reference implementation.
#[test]
fn test_binary_matrix_rank_test_e() {
    let e = e_1e6();

    let output = binary_matrix_rank_test(&e.slice(0..100_000)).unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.503604);

    let output = binary_matrix_rank_test(e).unwrap();
    assert_f64_eq!(output.p_value(), 0.306156);
}

/// Spectral DFT test on e, Appendix B.
#[test]
fn test_spectral_dft_e() {
    let output = spectral_dft_test(e_1e6()).unwrap();
    assert_f64_eq!(output.p_value(), 0.847187);
}

/// Non-overlapping template matching on e with m = 9 and N = 8, the template 000000001.
#[test]
fn test_non_overlapping_template_matching_e() {
    let output =
        non_overlapping_template_matching_test(e_1e6(), &NonOverlappingTemplateTestArgs::default())
            .unwrap();

    assert_eq!(output.len(), 148);
    assert_f64_eq!(output[0].p_value(), 0.078790);
}

/// Overlapping template matching on e. Only the probabilities of the reference implementation
/// reproduce Appendix B, the corrected probabilities give a different p-value.
#[test]
fn test_overlapping_template_matching_e() {
    let nist = OverlappingTemplateTestArgs::new_nist_behaviour(9).unwrap();
    let output = overlapping_template_matching_test(e_1e6(), nist).unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.110434);

    let output =
        overlapping_template_matching_test(e_1e6(), OverlappingTemplateTestArgs::default())
            .unwrap();
    assert_f64_eq!(output.p_value(), 0.159037);
}

/// Maurer's test on e, L = 7 and Q = 1280 are chosen for 10^6 bits.
#[test]
fn test_maurers_universal_statistical_e() {
    let output = maurers_universal_statistical_test(e_1e6()).unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.282568);
}

/// Linear complexity test on e with M = 500.
///
/// Appendix B lists 0.826335, computed with pi_0 = 0.01047 instead of 1/96. With the exact
/// probability the p-value is slightly lower.
#[test]
fn test_linear_complexity_e() {
    let output = linear_complexity_test(e_1e6(), DEFAULT_BLOCK_LENGTH).unwrap();
    assert!(output.passed(DEFAULT_THRESHOLD));
    assert_f64_eq!(output.p_value(), 0.826194);
    assert_f64_eq!(output.p_value(), 0.826335, 2e-4);
}

/// Approximate entropy test on e with m = 10, Appendix B.
#[test]
fn test_approximate_entropy_e() {
    let output = approximate_entropy_test(e_1e6(), ApproximateEntropyTestArg::default()).unwrap();
    assert_f64_eq!(output.p_value(), 0.700073);
}

/// Random excursions on e: x = +1 (index 4) and the variant's x = -1 (index 8), Appendix B.
#[test]
fn test_random_excursions_e() {
    let output = random_excursions_test(e_1e6()).unwrap();
    assert_eq!(output.len(), 8);
    assert_f64_eq!(output[4].p_value(), 0.786868);

    let output = random_excursions_variant_test(e_1e6()).unwrap();
    assert_eq!(output.len(), 18);
    assert_f64_eq!(output[8].p_value(), 0.826009);
}
