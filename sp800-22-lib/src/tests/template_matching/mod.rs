//! Everything necessary for the [Non-Overlapping](non_overlapping) and [Overlapping](overlapping)
//! template matching tests. For the tests themselves, see the corresponding submodules.
//!
//! This module also contains the template argument used by the non-overlapping test.
//! Templates are stored as numbers, with the first template bit as the most significant bit,
//! e.g. the template `001` is stored as `1`.

pub mod non_overlapping;

use crate::bitvec::BitVec;
use rayon::prelude::*;
use std::ops::RangeInclusive;

/// The default template length. For use in [TemplateArg].
pub const DEFAULT_TEMPLATE_LEN: usize = 9;

/// The allowed template lengths.
pub const TEMPLATE_LEN_RANGE: RangeInclusive<usize> = 2..=21;

/// This argument contains the templates to use.
///
/// For the template length `m`, the following bounds must be met: 2 <= `m` <= 21 - recommended: 9.
/// By default, all aperiodic templates of the given length are used, in ascending order.
///
/// These bounds are checked by all creation functions.
/// A default variant is available with [TemplateArg::default()].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateArg {
    templates: Vec<usize>,
    template_len: usize,
}

impl TemplateArg {
    /// Constructor using all aperiodic templates of the given length. See [TemplateArg].
    pub fn new(template_len: usize) -> Option<Self> {
        if TEMPLATE_LEN_RANGE.contains(&template_len) {
            Some(Self {
                templates: aperiodic_templates(template_len),
                template_len,
            })
        } else {
            None
        }
    }

    /// Constructor for custom templates - templates are checked for fitting length, if the length
    /// is not ok or no template is given, `None` is returned.
    pub fn new_with_custom_templates(templates: Vec<usize>, template_len: usize) -> Option<Self> {
        // Basic bounds check
        if !TEMPLATE_LEN_RANGE.contains(&template_len) || templates.is_empty() {
            return None;
        }

        let all_templates_have_right_len = templates
            .iter()
            .all(|&template| template < (1 << template_len));

        if all_templates_have_right_len {
            Some(Self {
                templates,
                template_len,
            })
        } else {
            None
        }
    }

    /// The templates, in the order they are tested.
    pub fn templates(&self) -> &[usize] {
        &self.templates
    }

    /// The length of each template in bits.
    pub fn template_len(&self) -> usize {
        self.template_len
    }
}

impl Default for TemplateArg {
    /// The default parameters are the ones recommended by NIST.
    fn default() -> Self {
        Self {
            templates: aperiodic_templates(DEFAULT_TEMPLATE_LEN),
            template_len: DEFAULT_TEMPLATE_LEN,
        }
    }
}

/// All aperiodic templates of the given length in ascending order.
///
/// A template is aperiodic if no proper prefix equals the suffix of the same length, i.e. it
/// cannot overlap with a shifted copy of itself.
pub fn aperiodic_templates(template_len: usize) -> Vec<usize> {
    (0..(1_usize << template_len))
        .filter(|&template| {
            (1..template_len).all(|shift| {
                let prefix = template >> shift;
                let suffix = template & ((1 << (template_len - shift)) - 1);
                prefix != suffix
            })
        })
        .collect()
}

/// Calculates the value of the `window_len` bit window starting at each index. Windows that would
/// reach beyond the end of the data are not part of the result.
pub(crate) fn windows(data: &BitVec, window_len: usize) -> Vec<u32> {
    debug_assert!(window_len <= u32::BITS as usize);

    let len = data.len_bit();
    if len < window_len {
        return Vec::new();
    }

    // every parallel part starts its own rolling window
    const PART_LEN: usize = 1 << 16;
    let count = len - window_len + 1;
    let mask = if window_len == u32::BITS as usize {
        u32::MAX
    } else {
        (1_u32 << window_len) - 1
    };

    (0..count.div_ceil(PART_LEN))
        .into_par_iter()
        .flat_map_iter(|part| {
            let start = part * PART_LEN;
            let end = usize::min(start + PART_LEN, count);

            let mut window = (start..(start + window_len - 1))
                .fold(0_u32, |window, idx| (window << 1) | (data.bit(idx) as u32));

            (start..end).map(move |idx| {
                window = ((window << 1) | (data.bit(idx + window_len - 1) as u32)) & mask;
                window
            })
        })
        .collect()
}
