//! Triangle Filter

use splat_core::filter::*;
use splat_core::geometry::*;
use splat_core::pbrt::*;

/// Implements the triangle filter in which the weight falls off linearly from
/// the filter center over the square extent of the filter.
pub struct TriangleFilter {
    /// Filter data.
    pub data: FilterData,
}

impl TriangleFilter {
    /// Default radius.
    pub const DEFAULT_RADIUS: Vector2f = Vector2f { x: 2.0, y: 2.0 };

    /// Returns a new instance of `TriangleFilter`.
    ///
    /// * `radius` - Radius of the filter in x and y directions; beyond this
    ///              filter is 0.
    pub fn new(radius: Vector2f) -> Self {
        Self {
            data: FilterData::new(radius),
        }
    }
}

impl Default for TriangleFilter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS)
    }
}

impl Filter for TriangleFilter {
    /// Return the filter parameters.
    fn get_data(&self) -> &FilterData {
        &self.data
    }

    /// Returns value of the filter at a given point.
    ///
    /// * `p` - The position of the sample point relative to the center of the
    ///         filter. The point should be within the filter's extent.
    fn evaluate(&self, p: &Point2f) -> Float {
        max(0.0, self.data.radius.x - abs(p.x)) * max(0.0, self.data.radius.y - abs(p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_off_linearly() {
        let filter = TriangleFilter::default();
        assert_eq!(filter.evaluate(&Point2f::new(0.0, 0.0)), 4.0);
        assert_eq!(filter.evaluate(&Point2f::new(1.0, 0.0)), 2.0);
        assert_eq!(filter.evaluate(&Point2f::new(-1.0, 1.0)), 1.0);
        assert_eq!(filter.evaluate(&Point2f::new(2.5, 0.0)), 0.0);
    }
}
