//! Non-overlapping Template Matching test.
//!
//! This test tries to detect RNGs that produce too many occurrences of a given aperiodic pattern.
//! This test uses an m-bit window to search for an m-bit pattern. After a match, the window
//! restarts behind the matched bits.
//!
//! This test allows for parameters, see [NonOverlappingTemplateTestArgs].

use super::{windows, TemplateArg, DEFAULT_TEMPLATE_LEN};
use crate::bitvec::BitVec;
use crate::internals::{check_f64, igamc, non_zero};
use crate::{Error, TestResult};
use rayon::prelude::*;
use std::num::NonZero;

/// The minimum input length, in bits, for this test: the default template length in each of
/// the default block count.
pub const MIN_INPUT_LENGTH: NonZero<usize> = non_zero(DEFAULT_TEMPLATE_LEN * DEFAULT_BLOCK_COUNT);

/// The default block count. For use in [NonOverlappingTemplateTestArgs].
pub const DEFAULT_BLOCK_COUNT: usize = 8;

/// The arguments for the Non-overlapping Template Matching Test.
///
/// 1. The templates, see [TemplateArg];
/// 2. The number of independent blocks to test in the sequence: `N`
///    1 <= `N` < 100 - recommended: 8
///
/// These bounds are checked by all creation functions.
/// A default variant is available with [NonOverlappingTemplateTestArgs::default()].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonOverlappingTemplateTestArgs {
    templates: TemplateArg,
    count_blocks: usize,
}

impl NonOverlappingTemplateTestArgs {
    /// Constructor using all aperiodic templates of the given length.
    /// For the meaning of the arguments, see [NonOverlappingTemplateTestArgs].
    pub fn new(template_len: usize, count_blocks: usize) -> Option<Self> {
        Self::new_with_custom_template(TemplateArg::new(template_len)?, count_blocks)
    }

    /// Constructor with a custom [TemplateArg].
    pub fn new_with_custom_template(templates: TemplateArg, count_blocks: usize) -> Option<Self> {
        if (1..100).contains(&count_blocks) {
            Some(Self {
                templates,
                count_blocks,
            })
        } else {
            None
        }
    }

    /// The templates to test.
    pub fn templates(&self) -> &TemplateArg {
        &self.templates
    }

    /// The block count `N`.
    pub fn count_blocks(&self) -> usize {
        self.count_blocks
    }
}

impl Default for NonOverlappingTemplateTestArgs {
    /// The default parameters are the ones recommended by NIST.
    fn default() -> Self {
        Self {
            templates: TemplateArg::default(),
            count_blocks: DEFAULT_BLOCK_COUNT,
        }
    }
}

/// Non-overlapping template match test - No. 7
///
/// Returns one result per template, in the order of the templates.
///
/// See the [module docs](crate::tests::template_matching::non_overlapping)
pub fn non_overlapping_template_matching_test(
    data: &BitVec,
    test_arg: &NonOverlappingTemplateTestArgs,
) -> Result<Vec<TestResult>, Error> {
    // Step 0: calculate block length M
    let NonOverlappingTemplateTestArgs {
        templates,
        count_blocks,
    } = test_arg;
    let count_blocks = *count_blocks;

    let block_length_bit = data.len_bit() / count_blocks;
    let template_len = templates.template_len();

    if block_length_bit < template_len {
        return Ok(vec![TestResult::skipped(
            "The block length is smaller than the template length.",
        )]);
    }

    // Step 1: the value of the template sized window at each position
    let windows = windows(data, template_len);

    // Step 3: compute the theoretical mean and variance
    let power_2_template_len = f64::powi(2.0, template_len as i32);
    let mean = ((block_length_bit - template_len + 1) as f64) / power_2_template_len;
    let variance = (block_length_bit as f64)
        * (1.0 / power_2_template_len
            - (2.0 * (template_len as f64) - 1.0) / f64::powi(power_2_template_len, 2));
    check_f64(variance)?;

    templates
        .templates()
        .par_iter()
        .map(|&template| {
            // Step 2: for each block, calculate the number of times the template matches
            // Step 4: compute chi = sum( (W_j - mean)^2 / variance ) over all blocks
            let chi = (0..count_blocks)
                .map(|block_idx| {
                    let start = block_idx * block_length_bit;
                    let end = start + block_length_bit - template_len + 1;
                    let matches = count_matches(&windows[start..end], template as u32, template_len);
                    f64::powi((matches as f64) - mean, 2) / variance
                })
                .sum::<f64>();

            check_f64(chi)?;

            // Step 5: compute p_value = igamc(count_blocks / 2, chi / 2)
            let p_value = igamc((count_blocks as f64) / 2.0, chi / 2.0)?;
            check_f64(p_value)?;

            Ok(TestResult::new(p_value).with_statistic(chi))
        })
        .collect()
}

/// Count matches in the window values of one block. On a match, the next `template_len - 1`
/// positions are skipped.
fn count_matches(windows: &[u32], template: u32, template_len: usize) -> usize {
    let mut matches = 0;
    let mut idx = 0;

    while idx < windows.len() {
        if windows[idx] == template {
            matches += 1;
            idx += template_len;
        } else {
            idx += 1;
        }
    }

    matches
}
