//! Instrumented film used by contribution pool tests

use super::Contribution;
use crate::film::{Film, TileSpan};
use crate::pbrt::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// A film that records everything it receives and checks that tiles are never written by two
/// threads at once. Tiles are horizontal bands of `tile_height` rows starting at 0.
pub(crate) struct RecordingFilm {
    tile_height: Float,
    group_count: usize,
    tiles: Vec<Mutex<Vec<Contribution>>>,
    writers: Vec<AtomicUsize>,
    overlapping_writes: AtomicBool,
    calls: AtomicUsize,
    sample_count: Mutex<f64>,
}

impl RecordingFilm {
    pub(crate) fn new(tile_count: usize, group_count: usize) -> Self {
        Self::with_tile_height(tile_count, group_count, 1.0)
    }

    pub(crate) fn with_tile_height(tile_count: usize, group_count: usize, tile_height: Float) -> Self {
        Self {
            tile_height,
            group_count,
            tiles: (0..tile_count).map(|_| Mutex::new(Vec::new())).collect(),
            writers: (0..tile_count).map(|_| AtomicUsize::new(0)).collect(),
            overlapping_writes: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            sample_count: Mutex::new(0.0),
        }
    }

    /// Contributions received by a tile in arrival order.
    pub(crate) fn received(&self, tile: usize) -> Vec<Contribution> {
        self.tiles[tile].lock().unwrap().clone()
    }

    /// Total contributions received over all tiles.
    pub(crate) fn total_received(&self) -> usize {
        self.tiles.iter().map(|t| t.lock().unwrap().len()).sum()
    }

    /// Sum of the weights received over all tiles.
    pub(crate) fn total_weight(&self) -> f64 {
        self.tiles
            .iter()
            .flat_map(|t| t.lock().unwrap().clone())
            .map(|c| c.variance as f64)
            .sum()
    }

    pub(crate) fn add_tile_samples_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn had_overlapping_writes(&self) -> bool {
        self.overlapping_writes.load(Ordering::SeqCst)
    }

    pub(crate) fn sample_count(&self) -> f64 {
        *self.sample_count.lock().unwrap()
    }
}

impl Film for RecordingFilm {
    fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    fn buffer_group_count(&self) -> usize {
        self.group_count
    }

    fn tile_indexes(&self, contrib: &Contribution) -> TileSpan {
        let last = self.tiles.len() - 1;
        let t = clamp((contrib.image_y / self.tile_height) as i64, 0, last as i64) as usize;
        TileSpan::single(t)
    }

    fn add_tile_samples(&self, contribs: &[Contribution], tile_index: usize) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.writers[tile_index].fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapping_writes.store(true, Ordering::SeqCst);
        }

        // Give a concurrent writer a chance to show up.
        std::thread::yield_now();
        self.tiles[tile_index]
            .lock()
            .unwrap()
            .extend_from_slice(contribs);

        self.writers[tile_index].fetch_sub(1, Ordering::SeqCst);
    }

    fn add_sample_count(&self, count: f64) {
        *self.sample_count.lock().unwrap() += count;
    }
}
