//! Slab tiling

use super::TileSpan;
use crate::pbrt::*;

/// Partition of the film's rows into horizontal slabs. Tiles are at least as tall as the filter's
/// vertical support so a contribution touches at most two of them.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlabTiling {
    /// First pixel row.
    y_start: usize,

    /// Number of pixel rows.
    y_count: usize,

    /// Number of tiles.
    tile_count: usize,

    /// Rows per tile.
    tile_height: usize,

    /// Offset applied to a sample's y position before dividing by the tile height.
    tile_offset: Float,

    /// Filter support height in tile units.
    tile_offset2: Float,
}

impl SlabTiling {
    /// Create a new `SlabTiling`.
    ///
    /// * `y_start`         - First pixel row.
    /// * `y_count`         - Number of pixel rows.
    /// * `filter_radius_y` - Vertical filter radius.
    /// * `requested`       - Requested number of tiles.
    pub fn new(y_start: usize, y_count: usize, filter_radius_y: Float, requested: usize) -> Self {
        let min_tile_height = max(1, (2.0 * filter_radius_y).floor() as usize);
        let max_tiles = max(1, y_count / min_tile_height);
        let count = clamp(requested, 1, max_tiles);

        let tile_height = max(
            (y_count as Float / count as Float).ceil() as usize,
            min_tile_height,
        );
        let tile_count = max(1, (y_count + tile_height - 1) / tile_height);

        debug!(
            "Film tiles: requested {}, actual {} of height {}",
            requested, tile_count, tile_height
        );

        Self {
            y_start,
            y_count,
            tile_count,
            tile_height,
            tile_offset: -0.5 - filter_radius_y - y_start as Float,
            tile_offset2: 2.0 * filter_radius_y / tile_height as Float,
        }
    }

    /// Returns the number of tiles.
    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Returns the number of rows per tile. The last tile may have fewer.
    pub fn tile_height(&self) -> usize {
        self.tile_height
    }

    /// Returns the tiles whose rows a sample at `image_y` can reach.
    ///
    /// * `image_y` - Sample position in y-direction.
    pub fn tile_indexes(&self, image_y: Float) -> TileSpan {
        let tile_y = (image_y + self.tile_offset) / self.tile_height as Float;
        let last = self.tile_count as i64 - 1;
        let first = clamp(tile_y as i64, 0, last) as usize;

        let second = first + 1;
        if second < self.tile_count && tile_y + self.tile_offset2 >= second as Float {
            TileSpan::pair(first, second)
        } else {
            TileSpan::single(first)
        }
    }

    /// Returns the half-open range of pixel rows `[start, end)` covered by a tile.
    ///
    /// * `tile_index` - The tile.
    pub fn tile_rows(&self, tile_index: usize) -> (usize, usize) {
        (
            self.y_start + min(tile_index * self.tile_height, self.y_count),
            self.y_start + min((tile_index + 1) * self.tile_height, self.y_count),
        )
    }
}
