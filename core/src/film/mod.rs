//! Film

mod config;
mod pixel;
mod tiled_film;
mod tiling;

use crate::contribution::Contribution;
use std::sync::Arc;

// Re-export.
pub use config::*;
pub use pixel::*;
pub use tiled_film::*;
pub use tiling::*;

/// The tiles a contribution's filter footprint spans. Tiles are horizontal slabs and the filter
/// support never exceeds a tile's height, so at most two tiles are touched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileSpan {
    /// First tile index.
    pub first: usize,

    /// Second tile index if the contribution straddles a tile boundary.
    pub second: Option<usize>,
}

impl TileSpan {
    /// Returns a span covering a single tile.
    ///
    /// * `tile` - The tile index.
    pub fn single(tile: usize) -> Self {
        Self {
            first: tile,
            second: None,
        }
    }

    /// Returns a span covering two adjacent tiles.
    ///
    /// * `first`  - First tile index.
    /// * `second` - Second tile index.
    pub fn pair(first: usize, second: usize) -> Self {
        Self {
            first,
            second: Some(second),
        }
    }

    /// Returns the number of tiles spanned; 1 or 2.
    pub fn count(&self) -> usize {
        if self.second.is_some() {
            2
        } else {
            1
        }
    }

    /// Returns an iterator over the spanned tile indices.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        std::iter::once(self.first).chain(self.second)
    }
}

/// The image buffer that receives contributions. The contribution pool only relies on this
/// interface; it never touches pixel data directly.
pub trait Film: Send + Sync {
    /// Returns the number of tiles the film is partitioned into.
    fn tile_count(&self) -> usize;

    /// Returns the number of buffer groups.
    fn buffer_group_count(&self) -> usize;

    /// Returns the tiles a contribution spans.
    ///
    /// * `contrib` - The contribution.
    fn tile_indexes(&self, contrib: &Contribution) -> TileSpan;

    /// Accumulates contributions into the pixels of a tile. Callers guarantee that only one thread
    /// adds samples to a given tile at a time.
    ///
    /// * `contribs`   - The contributions.
    /// * `tile_index` - The tile.
    fn add_tile_samples(&self, contribs: &[Contribution], tile_index: usize);

    /// Adds to the number of samples taken.
    ///
    /// * `count` - Number of full samples.
    fn add_sample_count(&self, count: f64);

    /// Adds a single contribution directly to every tile it spans, bypassing the contribution
    /// pool.
    ///
    /// * `contrib` - The contribution.
    fn add_sample(&self, contrib: &Contribution) {
        for tile in self.tile_indexes(contrib).iter() {
            self.add_tile_samples(std::slice::from_ref(contrib), tile);
        }
    }

    /// Returns `true` once the film has received enough samples to stop rendering.
    fn enough_samples(&self) -> bool {
        false
    }

    /// Called periodically by the renderer so the film can write out intermediate results.
    fn check_write_output_interval(&self) {}
}

/// Atomic reference counted `Film`.
pub type ArcFilm = Arc<dyn Film>;
