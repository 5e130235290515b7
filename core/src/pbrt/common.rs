//! Common

use num_traits::Num;
use std::ops::Neg;

/// Use 32-bit precision for floating point numbers.
pub type Float = f32;

/// Infinty (∞)
pub const INFINITY: Float = Float::INFINITY;

/// Returns the absolute value of a number.
///
/// * `n` - The number.
#[inline(always)]
pub fn abs<T>(n: T) -> T
where
    T: Num + Neg<Output = T> + PartialOrd + Copy,
{
    if n < T::zero() {
        -n
    } else {
        n
    }
}

/// Returns the minimum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn min<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a < b {
        a
    } else {
        b
    }
}

/// Returns the maximum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn max<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a > b {
        a
    } else {
        b
    }
}

/// Clamps a value to the range `[low, high]`.
///
/// * `val`  - The value.
/// * `low`  - Lower bound.
/// * `high` - Upper bound.
#[inline(always)]
pub fn clamp<T>(val: T, low: T, high: T) -> T
where
    T: PartialOrd + Copy,
{
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Returns `true` if a sample value is usable for accumulation, i.e. it is
/// neither negative, NaN nor infinite.
///
/// * `v` - The value.
#[inline(always)]
pub fn is_finite_non_negative(v: Float) -> bool {
    v >= 0.0 && v.is_finite()
}

/// Convert a 32-bit floating point value to its constituent bits.
///
/// * `f` - The 32-bit floating point number.
#[inline(always)]
pub fn float_to_bits(f: f32) -> u32 {
    f.to_bits()
}

/// Convert the bits of a 32-bit unsigned integer to a 32-bit floating point value.
///
/// * `i` - The 32-bit unsigned integer.
#[inline(always)]
pub fn bits_to_float(i: u32) -> f32 {
    f32::from_bits(i)
}

/// Convert a 64-bit floating point value to its constituent bits.
///
/// * `f` - The 64-bit floating point number.
#[inline(always)]
pub fn double_to_bits(f: f64) -> u64 {
    f.to_bits()
}

/// Convert the bits of a 64-bit unsigned integer to a 64-bit floating point value.
///
/// * `i` - The 64-bit unsigned integer.
#[inline(always)]
pub fn bits_to_double(i: u64) -> f64 {
    f64::from_bits(i)
}
