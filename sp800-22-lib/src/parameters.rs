//! The parameter resolver: derives every block length and template setting for an input length.
//!
//! The defaults follow the NIST recommendations, explicit [TestArgs] override them.
//! Resolving never fails: a test whose parameters cannot be derived for the given length is
//! skipped when it runs.

use crate::tests::approximate_entropy::ApproximateEntropyTestArg;
use crate::tests::longest_run_of_ones::LongestRunBlockLength;
use crate::tests::maurers_universal_statistical::UniversalTestArg;
use crate::tests::serial::SerialTestArg;
use crate::tests::template_matching::non_overlapping::NonOverlappingTemplateTestArgs;
use crate::tests::template_matching::overlapping::OverlappingTemplateTestArgs;
use crate::TestArgs;

/// All parameters of a suite run, resolved for one input length.
#[derive(Clone, Debug, PartialEq)]
pub struct TestParameters {
    /// The input length in bits the parameters were resolved for.
    pub len_bit: usize,
    /// Block length M of the frequency test within a block.
    pub frequency_block_length: usize,
    /// Block length of the longest run of ones test, `None` if the input is too short.
    pub longest_run: Option<LongestRunBlockLength>,
    pub non_overlapping_template: NonOverlappingTemplateTestArgs,
    pub overlapping_template: OverlappingTemplateTestArgs,
    /// `None` if the input is too short for Maurer's test.
    pub universal: Option<UniversalTestArg>,
    /// Block length M of the linear complexity test.
    pub linear_complexity_block_length: usize,
    /// Block length m of the serial test, `None` if the input is too short.
    pub serial: Option<SerialTestArg>,
    pub approximate_entropy: ApproximateEntropyTestArg,
}

impl TestParameters {
    /// Resolve all parameters for an input of `len_bit` bits.
    pub fn resolve(len_bit: usize, args: &TestArgs) -> Self {
        Self {
            len_bit,
            frequency_block_length: args.frequency_block.block_length(len_bit),
            longest_run: LongestRunBlockLength::for_length(len_bit),
            non_overlapping_template: args.non_overlapping_template.clone(),
            overlapping_template: args.overlapping_template,
            universal: UniversalTestArg::for_length(len_bit),
            linear_complexity_block_length: args.linear_complexity.block_length(),
            serial: args.serial.or_else(|| SerialTestArg::for_length(len_bit)),
            approximate_entropy: args.approximate_entropy,
        }
    }
}
