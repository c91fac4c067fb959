//! Bisection point arithmetic
//!
//! A disputed pair `(before, after)` split into `n` sub-intervals must place
//! its `i`-th commitment at
//!
//! ```text
//! before + floor(i * (after - before) / n)
//! ```
//!
//! Later intervals absorb the rounding remainder.

use crate::types::Step;

/// Step expected at position `i` of an `n`-way split of `before..after`
///
/// The product is widened to `u128` so large traces cannot overflow.
pub fn expected_step(before: Step, after: Step, i: u64, n: u64) -> Step {
    debug_assert!(after >= before && n > 0 && i <= n);
    let width = u128::from(after - before);
    let offset = u128::from(i) * width / u128::from(n);
    // offset <= width, which fits in a u64
    before + offset as u64
}

/// All `n + 1` steps of an `n`-way split of `before..after`
///
/// Returns `None` when the points would not be strictly increasing, which is
/// the case whenever `n` exceeds the width of the range or `n` is zero.
pub fn bisection_points(before: Step, after: Step, n: u64) -> Option<Vec<Step>> {
    if n == 0 || after <= before || n > after - before {
        return None;
    }
    Some((0..=n).map(|i| expected_step(before, after, i, n)).collect())
}
