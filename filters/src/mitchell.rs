//! Mitchell Filter

use splat_core::filter::*;
use splat_core::geometry::*;
use splat_core::pbrt::*;

/// Implements the Mitchell-Netravali filter, a piecewise cubic that trades off
/// ringing and blurring through its parameters `B` and `C`.
pub struct MitchellFilter {
    /// Filter data.
    pub data: FilterData,

    /// Parameter `B`.
    pub b: Float,

    /// Parameter `C`.
    pub c: Float,
}

impl MitchellFilter {
    /// Default radius.
    pub const DEFAULT_RADIUS: Vector2f = Vector2f { x: 2.0, y: 2.0 };

    /// Default `B`.
    pub const DEFAULT_B: Float = 1.0 / 3.0;

    /// Default `C`.
    pub const DEFAULT_C: Float = 1.0 / 3.0;

    /// Returns a new instance of `MitchellFilter`. Ideally the 2 parameters
    /// `B` and `C` should satisfy `B + 2C = 1`.
    ///
    /// * `radius` - Radius of the filter in x and y directions; beyond this
    ///              filter is 0.
    /// * `b`      - Parameter `B`.
    /// * `c`      - Parameter `C`.
    pub fn new(radius: Vector2f, b: Float, c: Float) -> Self {
        Self {
            data: FilterData::new(radius),
            b,
            c,
        }
    }

    /// Calculates the 1D filter function.
    ///
    /// * `x` - Distance from center of filter scaled to [-1, 1].
    fn mitchell_1d(&self, x: Float) -> Float {
        let x = abs(2.0 * x);
        let (b, c) = (self.b, self.c);

        if x > 2.0 {
            0.0
        } else if x > 1.0 {
            ((-b - 6.0 * c) * x * x * x
                + (6.0 * b + 30.0 * c) * x * x
                + (-12.0 * b - 48.0 * c) * x
                + (8.0 * b + 24.0 * c))
                * (1.0 / 6.0)
        } else {
            ((12.0 - 9.0 * b - 6.0 * c) * x * x * x
                + (-18.0 + 12.0 * b + 6.0 * c) * x * x
                + (6.0 - 2.0 * b))
                * (1.0 / 6.0)
        }
    }
}

impl Default for MitchellFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS, Self::DEFAULT_B, Self::DEFAULT_C)
    }
}

impl Filter for MitchellFilter {
    /// Return the filter parameters.
    fn get_data(&self) -> &FilterData {
        &self.data
    }

    /// Returns value of the filter at a given point.
    ///
    /// * `p` - The position of the sample point relative to the center of the
    ///         filter. The point should be within the filter's extent.
    fn evaluate(&self, p: &Point2f) -> Float {
        self.mitchell_1d(p.x * self.data.inv_radius.x)
            * self.mitchell_1d(p.y * self.data.inv_radius.y)
    }
}
