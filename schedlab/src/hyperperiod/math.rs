/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Integer helpers for period arithmetic.
//!
//! The hyperperiod, the exact utilisation window and the processor-demand
//! horizon are all LCMs of task periods; they share these functions.

use super::HyperperiodError;

/// Greatest common divisor by Euclid's algorithm; `gcd(x, 0) == x`.
pub fn gcd(a: u64, b: u64) -> u64 {
    let (mut x, mut y) = (a, b);
    while y != 0 {
        (x, y) = (y, x % y);
    }
    x
}

/// Least common multiple of two periods.
///
/// A zero operand yields `0`.  A result past `u64::MAX` is reported as
/// [`HyperperiodError::Overflow`] naming both operands.
pub fn lcm(a: u64, b: u64) -> Result<u64, HyperperiodError> {
    match (a, b) {
        (0, _) | (_, 0) => Ok(0),
        _ => (a / gcd(a, b))
            .checked_mul(b)
            .ok_or(HyperperiodError::Overflow { a, b }),
    }
}

/// LCM of all `values`; `0` when the slice is empty.
pub fn lcm_of_slice(values: &[u64]) -> Result<u64, HyperperiodError> {
    let Some((&first, rest)) = values.split_first() else {
        return Ok(0);
    };
    rest.iter().try_fold(first, |acc, &v| lcm(acc, v))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
