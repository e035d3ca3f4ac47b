//! Internal functions that are used by tests - can be changed anytime

use crate::Error;
use std::num::NonZero;

/// Checked addition of two integers, returning [Error::Overflow] on overflow.
macro_rules! checked_add {
    ($a: expr, $b: expr) => {{
        let (a, b) = ($a, $b);
        a.checked_add(b)
            .ok_or_else(|| $crate::Error::Overflow(format!("adding {a} and {b}")))
    }};
}

pub(crate) use checked_add;

/// Const constructor for non-zero literals. A zero fails at compile time.
pub(crate) const fn non_zero(value: usize) -> NonZero<usize> {
    match NonZero::new(value) {
        Some(value) => value,
        None => panic!("value must be non-zero"),
    }
}

/// The [complementary error function](https://en.wikipedia.org/wiki/Error_function)
#[inline]
pub(crate) fn erfc(value: f64) -> f64 {
    statrs::function::erf::erfc(value)
}

/// The upper regularized incomplete gamma function `Q(a, x) = Γ(a, x) / Γ(a)`.
///
/// `a` has to be positive and finite. For `x <= 0` the result is 1.
pub(crate) fn igamc(a: f64, x: f64) -> Result<f64, Error> {
    if a.is_nan() || a <= 0.0 || a.is_infinite() {
        return Err(Error::Domain(format!(
            "igamc: shape parameter a = {a} must be positive and finite"
        )));
    }

    check_f64(x)?;

    if x <= 0.0 {
        return Ok(1.0);
    }

    let value = statrs::function::gamma::checked_gamma_ur(a, x)?;
    check_f64(value)?;
    Ok(value)
}

/// Checks that the given value is neither NaN nor infinite.
#[inline]
pub(crate) fn check_f64(value: f64) -> Result<(), Error> {
    if value.is_nan() {
        Err(Error::NaN)
    } else if value.is_infinite() {
        Err(Error::Infinite)
    } else {
        Ok(())
    }
}

/// Counts the occurrences of every `block_length` bit pattern, with the sequence extended
/// circularly by its first `block_length - 1` bits. The index of the returned list is the
/// pattern, read MSB first.
///
/// Used by the serial and the approximate entropy test.
pub(crate) fn circular_pattern_counts(
    data: &crate::bitvec::BitVec,
    block_length: u8,
) -> Vec<usize> {
    let len = data.len_bit();
    let block_length = block_length as usize;
    let mut counts = vec![0_usize; 1 << block_length];

    if block_length == 0 || len == 0 {
        counts[0] = len;
        return counts;
    }

    let mask = (1_usize << block_length) - 1;

    // fill the window with the first block_length - 1 bits (wrapping around for tiny inputs)
    let mut window = (0..block_length - 1).fold(0_usize, |window, idx| {
        (window << 1) | (data.bit(idx % len) as usize)
    });

    for idx in 0..len {
        let next = data.bit((idx + block_length - 1) % len) as usize;
        window = ((window << 1) | next) & mask;
        counts[window] += 1;
    }

    counts
}

/// Derives the pattern counts for `block_length - 1` from the counts of `block_length`, both
/// circular. Each shorter pattern is the prefix of exactly two longer patterns.
pub(crate) fn shorten_pattern_counts(counts: &[usize]) -> Vec<usize> {
    if counts.len() <= 1 {
        return counts.to_vec();
    }

    counts.chunks_exact(2).map(|pair| pair[0] + pair[1]).collect()
}
