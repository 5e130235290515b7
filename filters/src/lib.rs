//! Filters

mod boxf; // box is reserved keyword
mod gaussian;
mod mitchell;
mod triangle;

use splat_core::filter::*;
use splat_core::geometry::*;
use std::sync::Arc;

// Re-export.
pub use boxf::*;
pub use gaussian::*;
pub use mitchell::*;
pub use triangle::*;

/// Names accepted by `make_filter()`.
pub const FILTER_NAMES: [&str; 4] = ["box", "gaussian", "mitchell", "triangle"];

/// Creates a filter by name with its default parameters.
///
/// * `name`   - Name.
/// * `radius` - Optional radius overriding the filter's default.
pub fn make_filter(name: &str, radius: Option<Vector2f>) -> Result<ArcFilter, String> {
    if let Some(r) = radius {
        if !(r.x > 0.0 && r.y > 0.0) {
            return Err(format!("Invalid filter radius {}.", r));
        }
    }

    match name {
        "box" => Ok(Arc::new(BoxFilter::new(
            radius.unwrap_or(BoxFilter::DEFAULT_RADIUS),
        ))),
        "gaussian" => Ok(Arc::new(GaussianFilter::new(
            radius.unwrap_or(GaussianFilter::DEFAULT_RADIUS),
            GaussianFilter::DEFAULT_ALPHA,
        ))),
        "mitchell" => Ok(Arc::new(MitchellFilter::new(
            radius.unwrap_or(MitchellFilter::DEFAULT_RADIUS),
            MitchellFilter::DEFAULT_B,
            MitchellFilter::DEFAULT_C,
        ))),
        "triangle" => Ok(Arc::new(TriangleFilter::new(
            radius.unwrap_or(TriangleFilter::DEFAULT_RADIUS),
        ))),
        _ => Err(format!("Filter '{}' unknown.", name)),
    }
}
