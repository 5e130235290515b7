//! Contribution Buffer

use super::*;
use crate::parallel::AtomicFloat;
use arc_swap::ArcSwap;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Producer front-end to a `ContributionPool`. Holds one active `Buffer` per film tile and buffer
/// group. Usually owned by a single rendering thread; it may be shared between threads, in which
/// case concurrent buffer swaps on the same slot are detected by the pool and ignored.
///
/// Dropping a `ContributionBuffer` hands all of its buffers, full or not, to the pool.
pub struct ContributionBuffer {
    /// The pool.
    pool: Arc<ContributionPool>,

    /// Samples taken but not yet handed to the pool.
    sample_count: AtomicFloat,

    /// Active buffers indexed by `[tile][buffer_group]`.
    buffers: Vec<Vec<ArcSwap<Buffer>>>,
}

impl ContributionBuffer {
    /// Create a new `ContributionBuffer` with an empty buffer for every tile and buffer group.
    ///
    /// * `pool` - The pool.
    pub fn new(pool: Arc<ContributionPool>) -> Self {
        let buffers = (0..pool.tile_count())
            .map(|_| {
                (0..pool.buffer_group_count())
                    .map(|_| ArcSwap::new(pool.acquire_buffer()))
                    .collect()
            })
            .collect();

        Self {
            pool,
            sample_count: AtomicFloat::new(0.0),
            buffers,
        }
    }

    /// Returns the pool.
    pub fn pool(&self) -> &Arc<ContributionPool> {
        &self.pool
    }

    /// Adds a contribution to the buffer of every tile it spans. Full buffers are swapped through
    /// the pool.
    ///
    /// * `contrib` - The contribution; its `buffer_group` selects the buffer group.
    /// * `weight`  - Sample weight; use 1.0 for unweighted samples.
    pub fn add(&self, contrib: &Contribution, weight: Float) {
        let buffer_group = contrib.buffer_group as usize;
        if buffer_group >= self.pool.buffer_group_count() {
            warn!(
                "Dropping contribution at ({}, {}) with invalid buffer group {}",
                contrib.image_x, contrib.image_y, buffer_group
            );
            return;
        }

        for tile_index in self.pool.film_tile_indexes(contrib).iter() {
            let slot = &self.buffers[tile_index][buffer_group];
            let max_retries = self.pool.config().max_retries;

            let mut retries = 0;
            while !slot.load().add(contrib, weight) {
                if retries == max_retries {
                    error!(
                        "Dropping contribution at ({}, {}) for tile {} after {} buffer swaps",
                        contrib.image_x, contrib.image_y, tile_index, retries
                    );
                    debug_assert!(false, "contribution buffer retries exhausted");
                    break;
                }
                retries += 1;

                self.pool
                    .next(slot, &self.sample_count, tile_index, buffer_group);
            }
        }
    }

    /// Adds to the number of samples taken.
    ///
    /// * `count` - Number of samples.
    pub fn add_sample_count(&self, count: Float) {
        self.sample_count.add(count);
    }

    /// Returns the samples taken but not yet handed to the pool.
    pub fn sample_count(&self) -> Float {
        self.sample_count.load(Ordering::Acquire)
    }

    /// Returns the active buffer slots indexed by `[tile][buffer_group]`.
    pub(super) fn slots(&self) -> &[Vec<ArcSwap<Buffer>>] {
        &self.buffers
    }

    /// Returns the pending sample count and resets it.
    pub(super) fn take_sample_count(&self) -> Float {
        self.sample_count.swap(0.0, Ordering::AcqRel)
    }
}

impl Drop for ContributionBuffer {
    fn drop(&mut self) {
        self.pool.end(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::test_film::RecordingFilm;
    use crate::film::ArcFilm;
    use crate::spectrum::XYZColor;

    fn contrib(y: Float) -> Contribution {
        Contribution::new(0.5, y, XYZColor::splat(1.0), 1.0, 0.0, 0.0, 0, 0)
    }

    fn pool(tiles: usize, buffer_size: usize) -> (Arc<RecordingFilm>, Arc<ContributionPool>) {
        let film = Arc::new(RecordingFilm::new(tiles, 1));
        let arc_film: ArcFilm = film.clone();
        let pool =
            ContributionPool::new(arc_film, PoolConfig::with_buffer_size(buffer_size)).unwrap();
        (film, Arc::new(pool))
    }

    #[test]
    fn new_takes_keepalive_buffer_first() {
        let (_film, pool) = pool(2, 4);
        let cb = ContributionBuffer::new(Arc::clone(&pool));
        assert_eq!(cb.slots().len(), 2);
        assert_eq!(pool.free_buffer_count(), 0);
        assert_eq!(pool.allocated_buffer_count(), 2);
    }

    #[test]
    fn add_routes_to_tile() {
        let (film, pool) = pool(3, 4);
        {
            let cb = ContributionBuffer::new(Arc::clone(&pool));
            cb.add(&contrib(2.5), 1.0);
            cb.add(&contrib(0.5), 1.0);
            assert_eq!(cb.slots()[2][0].load().len(), 1);
            assert_eq!(cb.slots()[0][0].load().len(), 1);
            assert!(cb.slots()[1][0].load().is_empty());
        }
        pool.flush();
        assert_eq!(film.received(0).len(), 1);
        assert_eq!(film.received(1).len(), 0);
        assert_eq!(film.received(2).len(), 1);
    }

    #[test]
    fn full_buffer_is_splatted_on_next_add() {
        let (film, pool) = pool(1, 2);
        let cb = ContributionBuffer::new(Arc::clone(&pool));
        cb.add(&contrib(0.5), 1.0);
        cb.add(&contrib(0.5), 1.0);
        assert_eq!(film.total_received(), 0);

        cb.add(&contrib(0.5), 1.0);
        assert_eq!(film.total_received(), 2);
        assert_eq!(cb.slots()[0][0].load().len(), 1);
    }

    #[test]
    fn add_drops_contribution_with_unknown_buffer_group() {
        let (film, pool) = pool(2, 4);
        {
            let cb = ContributionBuffer::new(Arc::clone(&pool));
            let mut c = contrib(0.5);
            c.buffer_group = 1;
            cb.add(&c, 1.0);
            assert!(cb.slots().iter().flatten().all(|slot| slot.load().is_empty()));

            cb.add(&contrib(1.5), 1.0);
        }
        pool.flush();
        assert_eq!(film.total_received(), 1);
        assert_eq!(film.received(1).len(), 1);
    }

    #[test]
    fn sample_count_moves_to_pool_on_drop() {
        let (_film, pool) = pool(1, 4);
        let cb = ContributionBuffer::new(Arc::clone(&pool));
        cb.add_sample_count(1.0);
        cb.add_sample_count(2.0);
        assert_eq!(cb.sample_count(), 3.0);

        drop(cb);
        assert_eq!(pool.pending_sample_count(), 3.0);
    }
}
