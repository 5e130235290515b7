//! Contribution Buffer storage

use super::Contribution;
use crate::film::Film;
use crate::pbrt::*;
use crate::{stat_counter, stat_inc, stat_int_distribution, stat_dist, stat_register_fns};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

stat_counter!(
    "Contribution pool/Contributions splatted",
    CONTRIBUTIONS_SPLATTED,
    buffer_stats_splatted
);
stat_int_distribution!(
    "Contribution pool/Contributions per buffer splat",
    CONTRIBUTIONS_PER_SPLAT,
    buffer_stats_per_splat
);

stat_register_fns!(buffer_stats_splatted, buffer_stats_per_splat);

/// Fixed capacity staging area for contributions. Any number of threads may append concurrently;
/// each append claims a unique slot through an atomic cursor or fails cleanly once the buffer is
/// full.
pub struct Buffer {
    /// Next free slot. Grows past the capacity once the buffer overflows.
    pos: AtomicU32,

    /// Number of slots whose write has completed.
    committed: AtomicU32,

    /// Set while the buffer waits for or undergoes a splat.
    queued: AtomicBool,

    /// Contribution storage.
    contribs: Box<[UnsafeCell<Contribution>]>,
}

// SAFETY: Slots are only written by the thread that claimed them through `pos` and are only read by
// `splat()` once `committed` shows the write finished. Slots are reclaimed for writing only after
// `splat()` resets `pos`, which happens after all reads.
unsafe impl Sync for Buffer {}

impl Buffer {
    /// Create a new empty `Buffer`.
    ///
    /// * `capacity` - Number of contributions the buffer holds.
    pub fn new(capacity: usize) -> Self {
        register_stats();

        Self {
            pos: AtomicU32::new(0),
            committed: AtomicU32::new(0),
            queued: AtomicBool::new(false),
            contribs: (0..capacity)
                .map(|_| UnsafeCell::new(Contribution::default()))
                .collect(),
        }
    }

    /// Returns the number of contributions the buffer holds.
    pub fn capacity(&self) -> usize {
        self.contribs.len()
    }

    /// Returns the number of contributions stored.
    pub fn len(&self) -> usize {
        min(self.pos.load(Ordering::Acquire) as usize, self.capacity())
    }

    /// Returns `true` if no contributions are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if no further contribution fits.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Returns `true` if the buffer has been handed to the pool and not yet splatted.
    pub fn is_queued(&self) -> bool {
        self.queued.load(Ordering::Acquire)
    }

    /// Marks the buffer as handed to the pool.
    pub(crate) fn set_queued(&self) {
        self.queued.store(true, Ordering::Release);
    }

    /// Stores a contribution with the given weight. Returns `false` without writing anything if the
    /// buffer is full.
    ///
    /// * `contrib` - The contribution.
    /// * `weight`  - Sample weight stored in the contribution's `variance`.
    pub fn add(&self, contrib: &Contribution, weight: Float) -> bool {
        let capacity = self.contribs.len() as u32;

        // Avoid growing the cursor without bound once the buffer is full.
        if self.pos.load(Ordering::Relaxed) >= capacity {
            return false;
        }

        let i = self.pos.fetch_add(1, Ordering::Acquire);
        if i >= capacity {
            return false;
        }

        let mut c = *contrib;
        c.variance = weight;

        // SAFETY: `fetch_add` hands out slot `i` to this call only; no other writer or reader
        // touches it until `committed` is bumped below.
        unsafe {
            self.contribs[i as usize].get().write(c);
        }
        self.committed.fetch_add(1, Ordering::Release);
        true
    }

    /// Writes the stored contributions to a film tile in insertion order and empties the buffer.
    /// The buffer must no longer be reachable by producers.
    ///
    /// * `film`       - The film.
    /// * `tile_index` - The tile that receives the contributions.
    pub(crate) fn splat(&self, film: &dyn Film, tile_index: usize) {
        let n = self.len();

        // A writer may still be finishing its slot.
        while (self.committed.load(Ordering::Acquire) as usize) < n {
            std::hint::spin_loop();
        }

        if n > 0 {
            // SAFETY: `UnsafeCell<Contribution>` has the same layout as `Contribution` and the first
            // `n` slots have been committed. The cursor is past them so no writer claims them until
            // the reset below.
            let data =
                unsafe { std::slice::from_raw_parts(self.contribs.as_ptr() as *const Contribution, n) };
            film.add_tile_samples(data, tile_index);
        }

        stat_inc!(CONTRIBUTIONS_SPLATTED, n as i64);
        stat_dist!(CONTRIBUTIONS_PER_SPLAT, n as i64);

        self.committed.store(0, Ordering::Relaxed);
        self.pos.store(0, Ordering::Release);
        self.queued.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::test_film::RecordingFilm;
    use crate::spectrum::XYZColor;
    use std::sync::Arc;

    fn contrib(x: Float) -> Contribution {
        Contribution::new(x, 0.5, XYZColor::splat(1.0), 1.0, 0.0, 0.0, 0, 0)
    }

    #[test]
    fn overflow_returns_false() {
        let buffer = Buffer::new(1);
        assert!(buffer.add(&contrib(0.0), 1.0));
        assert!(!buffer.add(&contrib(1.0), 1.0));
        assert_eq!(buffer.len(), 1);
        assert!(buffer.is_full());
    }

    #[test]
    fn add_overwrites_variance_with_weight() {
        let film = RecordingFilm::new(1, 1);
        let buffer = Buffer::new(4);
        assert!(buffer.add(&contrib(0.0), 0.25));
        buffer.splat(&film, 0);

        let received = film.received(0);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].variance, 0.25);
    }

    #[test]
    fn splat_preserves_order_and_resets() {
        let film = RecordingFilm::new(1, 1);
        let buffer = Buffer::new(8);
        buffer.set_queued();
        for i in 0..5 {
            assert!(buffer.add(&contrib(i as Float), 1.0));
        }
        buffer.splat(&film, 0);

        let xs: Vec<Float> = film.received(0).iter().map(|c| c.image_x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(buffer.is_empty());
        assert!(!buffer.is_queued());
        assert!(buffer.add(&contrib(9.0), 1.0));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn splat_of_empty_buffer_writes_nothing() {
        let film = RecordingFilm::new(1, 1);
        let buffer = Buffer::new(8);
        buffer.splat(&film, 0);
        assert_eq!(film.add_tile_samples_calls(), 0);
    }

    #[test]
    fn concurrent_adds_claim_unique_slots() {
        let buffer = Arc::new(Buffer::new(1000));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let buffer = Arc::clone(&buffer);
                std::thread::spawn(move || {
                    (0..400)
                        .filter(|i| buffer.add(&contrib((t * 1000 + i) as Float), 1.0))
                        .count()
                })
            })
            .collect();
        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted, 1000);

        let film = RecordingFilm::new(1, 1);
        buffer.splat(&film, 0);
        let mut xs: Vec<i64> = film.received(0).iter().map(|c| c.image_x as i64).collect();
        xs.sort_unstable();
        xs.dedup();
        assert_eq!(xs.len(), 1000);
    }
}
