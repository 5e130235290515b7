//! Filter

mod table;

use crate::geometry::*;
use crate::pbrt::*;
use std::sync::Arc;

// Re-export.
pub use table::*;

/// Reconstruction filter interface used by the film to distribute a contribution over the pixels
/// within its support.
pub trait Filter: Send + Sync {
    /// Return the filter parameters.
    fn get_data(&self) -> &FilterData;

    /// Returns value of the filter at a given point.
    ///
    /// * `p` - The position of the sample point relative to the center of the
    ///         filter. The point should be within the filter's extent.
    fn evaluate(&self, p: &Point2f) -> Float;
}

/// Atomic reference counted `Filter`.
pub type ArcFilter = Arc<dyn Filter>;

/// Data for filters centered at origin (0, 0).
#[derive(Copy, Clone, Debug)]
pub struct FilterData {
    /// Radius of the filter in x and y directions; beyond this filter is 0.
    pub radius: Vector2f,

    /// Reciprocal of filter radii.
    pub inv_radius: Vector2f,
}

impl FilterData {
    /// Returns a new instance of `FilterData`.
    ///
    /// * `radius` - Radius of the filter in x and y directions; beyond this
    ///              filter is 0.
    pub fn new(radius: Vector2f) -> Self {
        Self {
            radius,
            inv_radius: radius.recip(),
        }
    }
}
