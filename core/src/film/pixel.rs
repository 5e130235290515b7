//! Film pixels

use crate::pbrt::*;
use crate::spectrum::*;

/// Running weighted sums of the contributions to a pixel.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Pixel {
    /// Weighted sum of XYZ colors.
    pub xyz: XYZColor,

    /// Weighted sum of alpha values.
    pub alpha: Float,

    /// Sum of weights.
    pub weight_sum: Float,
}

impl Pixel {
    /// Adds a weighted sample.
    ///
    /// * `xyz`    - Color.
    /// * `alpha`  - Alpha.
    /// * `weight` - Filter weight times sample weight.
    #[inline]
    pub fn add(&mut self, xyz: &XYZColor, alpha: Float, weight: Float) {
        self.xyz += *xyz * weight;
        self.alpha += alpha * weight;
        self.weight_sum += weight;
    }

    /// Adds the sums of another pixel.
    ///
    /// * `other` - The pixel.
    #[inline]
    pub fn merge(&mut self, other: &Pixel) {
        self.xyz += other.xyz;
        self.alpha += other.alpha;
        self.weight_sum += other.weight_sum;
    }

    /// Returns the normalized color or black if nothing was added.
    pub fn weighted_xyz(&self) -> XYZColor {
        if self.weight_sum > 0.0 {
            self.xyz * (1.0 / self.weight_sum)
        } else {
            XYZColor::BLACK
        }
    }

    /// Returns the normalized alpha or 0 if nothing was added.
    pub fn weighted_alpha(&self) -> Float {
        if self.weight_sum > 0.0 {
            self.alpha / self.weight_sum
        } else {
            0.0
        }
    }
}

/// Running sum of sample depths.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DepthPixel {
    /// Sum of depths.
    pub depth_sum: Float,

    /// Sum of weights.
    pub weight_sum: Float,
}

impl DepthPixel {
    /// Adds a depth sample.
    ///
    /// * `depth`  - Depth.
    /// * `weight` - Weight.
    #[inline]
    pub fn add(&mut self, depth: Float, weight: Float) {
        self.depth_sum += depth * weight;
        self.weight_sum += weight;
    }

    /// Returns the average depth or 0 if nothing was added.
    pub fn depth(&self) -> Float {
        if self.weight_sum > 0.0 {
            self.depth_sum / self.weight_sum
        } else {
            0.0
        }
    }
}
