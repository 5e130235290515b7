//! Gaussian Filter

use splat_core::filter::*;
use splat_core::geometry::*;
use splat_core::pbrt::*;

/// Implements the Gaussian filter which applies a bump that is centered at the
/// pixel and radially symmetric around it. The Gaussian's value at the radius
/// is subtracted so the filter goes to 0 at its extent.
pub struct GaussianFilter {
    /// Filter data.
    pub data: FilterData,

    /// Falloff rate.
    pub alpha: Float,

    /// Stores e^(-alpha * radius.x^2).
    pub exp_x: Float,

    /// Stores e^(-alpha * radius.y^2).
    pub exp_y: Float,
}

impl GaussianFilter {
    /// Default radius.
    pub const DEFAULT_RADIUS: Vector2f = Vector2f { x: 2.0, y: 2.0 };

    /// Default falloff rate.
    pub const DEFAULT_ALPHA: Float = 2.0;

    /// Returns a new instance of `GaussianFilter`.
    ///
    /// * `radius` - Radius of the filter in x and y directions; beyond this
    ///              filter is 0.
    /// * `alpha`  - Falloff rate.
    pub fn new(radius: Vector2f, alpha: Float) -> Self {
        Self {
            data: FilterData::new(radius),
            alpha,
            exp_x: (-alpha * radius.x * radius.x).exp(),
            exp_y: (-alpha * radius.y * radius.y).exp(),
        }
    }

    /// Calculates the Gaussian filter function for a given distance.
    ///
    /// * `d`    - Distance in x or y direction.
    /// * `expv` - Corresponding exponent `exp_x` or `exp_y`.
    fn gaussian(&self, d: Float, expv: Float) -> Float {
        max(0.0, (-self.alpha * d * d).exp() - expv)
    }
}

impl Default for GaussianFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS, Self::DEFAULT_ALPHA)
    }
}

impl Filter for GaussianFilter {
    /// Return the filter parameters.
    fn get_data(&self) -> &FilterData {
        &self.data
    }

    /// Returns value of the filter at a given point.
    ///
    /// * `p` - The position of the sample point relative to the center of the
    ///         filter. The point should be within the filter's extent.
    fn evaluate(&self, p: &Point2f) -> Float {
        self.gaussian(p.x, self.exp_x) * self.gaussian(p.y, self.exp_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn zero_at_radius() {
        let filter = GaussianFilter::default();
        assert!(approx_eq!(
            f32,
            filter.evaluate(&Point2f::new(2.0, 0.0)),
            0.0,
            epsilon = 1e-6
        ));
    }

    #[test]
    fn peak_at_center() {
        let filter = GaussianFilter::default();
        let e = (-8.0_f32).exp();
        let expected = (1.0 - e) * (1.0 - e);
        assert!(approx_eq!(
            f32,
            filter.evaluate(&Point2f::new(0.0, 0.0)),
            expected,
            epsilon = 1e-6
        ));
        assert!(filter.evaluate(&Point2f::new(0.5, 0.0)) < expected);
    }
}
