//! Filter Table

use super::*;

/// Filter table width.
pub const FILTER_TABLE_WIDTH: usize = 16;

/// Filter table size.
pub const FILTER_TABLE_SIZE: usize = FILTER_TABLE_WIDTH * FILTER_TABLE_WIDTH;

/// Reciprocal of `FILTER_TABLE_WIDTH`.
pub const INV_FILTER_TABLE_WIDTH: Float = 1.0 / (FILTER_TABLE_WIDTH as Float);

/// Precomputed filter values over the positive quadrant of the filter's support. Filters are
/// symmetric so a lookup uses the absolute offset from the filter center.
#[derive(Clone)]
pub struct FilterTable {
    /// Filter parameters.
    data: FilterData,

    /// Table values in row-major order.
    values: [Float; FILTER_TABLE_SIZE],
}

impl FilterTable {
    /// Create a new `FilterTable` by evaluating the filter at the center of each table cell.
    ///
    /// * `filter` - The filter.
    pub fn new(filter: &dyn Filter) -> Self {
        let data = *filter.get_data();
        let mut values = [0.0; FILTER_TABLE_SIZE];
        let mut offset = 0;
        for y in 0..FILTER_TABLE_WIDTH {
            for x in 0..FILTER_TABLE_WIDTH {
                let p = Point2f::new(
                    (x as Float + 0.5) * data.radius.x * INV_FILTER_TABLE_WIDTH,
                    (y as Float + 0.5) * data.radius.y * INV_FILTER_TABLE_WIDTH,
                );
                values[offset] = filter.evaluate(&p);
                offset += 1;
            }
        }
        Self { data, values }
    }

    /// Returns the filter parameters.
    pub fn data(&self) -> &FilterData {
        &self.data
    }

    /// Returns the tabulated filter value at an offset from the filter center. Offsets outside
    /// the filter radius return 0.
    ///
    /// * `dx` - Offset in x-direction.
    /// * `dy` - Offset in y-direction.
    pub fn lookup(&self, dx: Float, dy: Float) -> Float {
        let fx = abs(dx) * self.data.inv_radius.x;
        let fy = abs(dy) * self.data.inv_radius.y;
        if fx > 1.0 || fy > 1.0 {
            return 0.0;
        }

        let last = FILTER_TABLE_WIDTH - 1;
        let ix = min((fx * FILTER_TABLE_WIDTH as Float) as usize, last);
        let iy = min((fy * FILTER_TABLE_WIDTH as Float) as usize, last);
        self.values[iy * FILTER_TABLE_WIDTH + ix]
    }
}
