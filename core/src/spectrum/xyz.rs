//! XYZ Color

use crate::pbrt::*;
use std::ops::{Add, AddAssign, Index, Mul, MulAssign};

/// Tristimulus color in CIE XYZ space. This is the color representation carried by
/// contributions and accumulated in film pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C)]
pub struct XYZColor {
    /// The X, Y and Z coefficients.
    pub c: [Float; 3],
}

impl XYZColor {
    /// Black.
    pub const BLACK: Self = Self { c: [0.0; 3] };

    /// Create a new `XYZColor`.
    ///
    /// * `x` - X coefficient.
    /// * `y` - Y coefficient (luminance).
    /// * `z` - Z coefficient.
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Self { c: [x, y, z] }
    }

    /// Create a `XYZColor` with all coefficients set to the same value.
    ///
    /// * `v` - The value.
    pub fn splat(v: Float) -> Self {
        Self { c: [v; 3] }
    }

    /// Create a `XYZColor` from linear RGB coefficients.
    ///
    /// * `rgb` - The RGB coefficients.
    pub fn from_rgb(rgb: &[Float; 3]) -> Self {
        Self { c: rgb_to_xyz(rgb) }
    }

    /// Returns the luminance.
    pub fn y(&self) -> Float {
        self.c[1]
    }

    /// Returns `true` if all coefficients are zero.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|&v| v == 0.0)
    }

    /// Returns `true` if any coefficient is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns the linear RGB coefficients.
    pub fn to_rgb(&self) -> [Float; 3] {
        xyz_to_rgb(&self.c)
    }
}

impl Add for XYZColor {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.c[0] + other.c[0], self.c[1] + other.c[1], self.c[2] + other.c[2])
    }
}

impl AddAssign for XYZColor {
    fn add_assign(&mut self, other: Self) {
        self.c[0] += other.c[0];
        self.c[1] += other.c[1];
        self.c[2] += other.c[2];
    }
}

impl Mul<Float> for XYZColor {
    type Output = Self;

    fn mul(self, f: Float) -> Self::Output {
        Self::new(self.c[0] * f, self.c[1] * f, self.c[2] * f)
    }
}

impl Mul<XYZColor> for Float {
    type Output = XYZColor;

    fn mul(self, c: XYZColor) -> Self::Output {
        c * self
    }
}

impl MulAssign<Float> for XYZColor {
    fn mul_assign(&mut self, f: Float) {
        self.c[0] *= f;
        self.c[1] *= f;
        self.c[2] *= f;
    }
}

impl Index<usize> for XYZColor {
    type Output = Float;

    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

/// Converts XYZ coefficients to linear RGB coefficients using the RGB primaries
/// defined for high-definition TVs.
///
/// * `xyz` - The XYZ coefficients.
#[rustfmt::skip]
pub fn xyz_to_rgb(xyz: &[Float; 3]) -> [Float; 3] {
    [
         3.240479 * xyz[0] - 1.537150 * xyz[1] - 0.498535 * xyz[2],
        -0.969256 * xyz[0] + 1.875991 * xyz[1] + 0.041556 * xyz[2],
         0.055648 * xyz[0] - 0.204043 * xyz[1] + 1.057311 * xyz[2],
    ]
}

/// Converts linear RGB coefficients to XYZ coefficients.
///
/// * `rgb` - The RGB coefficients.
#[rustfmt::skip]
pub fn rgb_to_xyz(rgb: &[Float; 3]) -> [Float; 3] {
    [
        0.412453 * rgb[0] + 0.357580 * rgb[1] + 0.180423 * rgb[2],
        0.212671 * rgb[0] + 0.715160 * rgb[1] + 0.072169 * rgb[2],
        0.019334 * rgb[0] + 0.119193 * rgb[1] + 0.950227 * rgb[2],
    ]
}
