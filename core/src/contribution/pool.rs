//! Contribution Pool

use super::*;
use crate::film::{ArcFilm, TileSpan};
use crate::parallel::AtomicFloat;
use crate::{stat_counter, stat_inc, stat_memory_counter, stat_register_fns};
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

stat_counter!(
    "Contribution pool/Buffer swaps",
    BUFFER_SWAPS,
    pool_stats_swaps
);
stat_counter!(
    "Contribution pool/Stale buffer swaps",
    STALE_SWAPS,
    pool_stats_stale_swaps
);
stat_counter!(
    "Contribution pool/Tile splats",
    TILE_SPLATS,
    pool_stats_tile_splats
);
stat_counter!(
    "Contribution pool/Buffer misses",
    BUFFER_MISSES,
    pool_stats_misses
);
stat_counter!(
    "Contribution pool/Buffers allocated",
    BUFFERS_ALLOCATED,
    pool_stats_allocated
);
stat_memory_counter!(
    "Memory/Contribution buffers",
    BUFFER_MEMORY,
    pool_stats_memory
);

stat_register_fns!(
    pool_stats_swaps,
    pool_stats_stale_swaps,
    pool_stats_tile_splats,
    pool_stats_misses,
    pool_stats_allocated,
    pool_stats_memory,
);

/// Buffer lists and counters guarded by the pool mutex.
struct PoolState {
    /// Empty buffers ready for reuse.
    free: Vec<Arc<Buffer>>,

    /// Full buffers awaiting a splat indexed by `[tile][buffer_group]`.
    full: Vec<Vec<Vec<Arc<Buffer>>>>,

    /// Samples taken but not yet reported to the film.
    sample_count: Float,

    /// Number of buffers allocated because the free list was empty.
    splatting_misses: usize,
}

/// Shared coordinator between the contribution producers and the film.
///
/// Producers hand in full buffers through `next()`. The first producer to hand in a buffer for an
/// idle tile becomes that tile's splatter and writes every pending buffer of the tile into the film;
/// everyone else gets an empty buffer and goes back to rendering. Different tiles are splatted in
/// parallel; a single tile never has more than one writer.
pub struct ContributionPool {
    /// The film receiving contributions.
    film: ArcFilm,

    /// Tunables.
    config: PoolConfig,

    /// Number of film tiles.
    tile_count: usize,

    /// Number of film buffer groups.
    buffer_group_count: usize,

    /// Buffer lists guarded by the pool mutex.
    state: Mutex<PoolState>,

    /// Per tile splat requests; non-zero while a thread is splatting the tile.
    splatting_tile: Vec<AtomicU32>,

    /// Serialises splatters while they report sample counts and claim a tile.
    pub(super) main_splatting: Mutex<()>,

    /// Held while a tile is being written to the film.
    tile_splatting: Vec<Mutex<()>>,

    /// Number of buffers currently alive.
    allocated: AtomicUsize,
}

impl ContributionPool {
    /// Create a new `ContributionPool` for a film. `keepalive` empty buffers are allocated up front.
    ///
    /// * `film`   - The film.
    /// * `config` - Tunables.
    pub fn new(film: ArcFilm, config: PoolConfig) -> Result<Self, String> {
        register_stats();
        config.validate()?;

        let tile_count = film.tile_count();
        let buffer_group_count = film.buffer_group_count();
        if tile_count == 0 {
            return Err("Film has no tiles.".to_string());
        }
        if buffer_group_count == 0 {
            return Err("Film has no buffer groups.".to_string());
        }
        if buffer_group_count > u16::MAX as usize + 1 {
            return Err(format!("Too many buffer groups {}.", buffer_group_count));
        }

        let pool = Self {
            film,
            config,
            tile_count,
            buffer_group_count,
            state: Mutex::new(PoolState {
                free: Vec::with_capacity(config.keepalive),
                full: (0..tile_count)
                    .map(|_| (0..buffer_group_count).map(|_| Vec::new()).collect())
                    .collect(),
                sample_count: 0.0,
                splatting_misses: 0,
            }),
            splatting_tile: (0..tile_count).map(|_| AtomicU32::new(0)).collect(),
            main_splatting: Mutex::new(()),
            tile_splatting: (0..tile_count).map(|_| Mutex::new(())).collect(),
            allocated: AtomicUsize::new(0),
        };

        {
            let mut state = pool.state.lock().unwrap();
            for _ in 0..config.keepalive {
                let buffer = pool.new_buffer();
                state.free.push(buffer);
            }
        }

        debug!(
            "Contribution pool: {} tiles, {} buffer groups, buffer size {}",
            tile_count, buffer_group_count, config.buffer_size
        );

        Ok(pool)
    }

    /// Returns the film.
    pub fn film(&self) -> &ArcFilm {
        &self.film
    }

    /// Returns the tunables.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Returns the number of film tiles.
    pub fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Returns the number of film buffer groups.
    pub fn buffer_group_count(&self) -> usize {
        self.buffer_group_count
    }

    /// Returns the tiles a contribution spans.
    ///
    /// * `contrib` - The contribution.
    pub fn film_tile_indexes(&self, contrib: &Contribution) -> TileSpan {
        self.film.tile_indexes(contrib)
    }

    /// Returns the number of empty buffers on the free list.
    pub fn free_buffer_count(&self) -> usize {
        self.state.lock().unwrap().free.len()
    }

    /// Returns the number of full buffers awaiting a splat.
    pub fn full_buffer_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.full.iter().flatten().map(|g| g.len()).sum()
    }

    /// Returns the number of buffers alive, whether free, full or held by a producer.
    pub fn allocated_buffer_count(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    /// Returns the number of buffers allocated because the free list was empty.
    pub fn splatting_misses(&self) -> usize {
        self.state.lock().unwrap().splatting_misses
    }

    /// Returns the samples taken but not yet reported to the film.
    pub fn pending_sample_count(&self) -> Float {
        self.state.lock().unwrap().sample_count
    }

    /// Allocates a new empty buffer.
    fn new_buffer(&self) -> Arc<Buffer> {
        self.allocated.fetch_add(1, Ordering::AcqRel);
        stat_inc!(BUFFERS_ALLOCATED, 1);
        stat_inc!(
            BUFFER_MEMORY,
            (self.config.buffer_size * std::mem::size_of::<Contribution>()) as u64
        );
        Arc::new(Buffer::new(self.config.buffer_size))
    }

    /// Returns a buffer from the free list or allocates a new one. Used to populate new
    /// `ContributionBuffer`s.
    pub(super) fn acquire_buffer(&self) -> Arc<Buffer> {
        let free = self.state.lock().unwrap().free.pop();
        match free {
            Some(buffer) => buffer,
            None => self.new_buffer(),
        }
    }

    /// Swaps the full buffer in a producer slot for an empty one. If no thread is splatting the
    /// tile, the calling thread splats every full buffer of the tile before returning.
    ///
    /// * `slot`         - The producer slot holding the full buffer.
    /// * `sample_count` - The producer's pending sample count; moved into the pool.
    /// * `tile_index`   - The tile of the slot.
    /// * `buffer_group` - The buffer group of the slot.
    pub fn next(
        &self,
        slot: &ArcSwap<Buffer>,
        sample_count: &AtomicFloat,
        tile_index: usize,
        buffer_group: usize,
    ) {
        let full_buffer = slot.load_full();

        let mut state = self.state.lock().unwrap();

        // Another thread sharing the producer already swapped the buffer, or the buffer was
        // splatted in the meantime and has room again.
        if !Arc::ptr_eq(&*slot.load(), &full_buffer) || !full_buffer.is_full() {
            stat_inc!(STALE_SWAPS, 1);
            return;
        }

        // Another thread sharing the producer is splatting this very buffer. The splatter holds
        // the main splatting mutex until it owns the tile, so waiting on both sees it through.
        if full_buffer.is_queued() {
            stat_inc!(STALE_SWAPS, 1);
            drop(state);
            drop(self.main_splatting.lock().unwrap());
            drop(self.tile_splatting[tile_index].lock().unwrap());
            return;
        }
        stat_inc!(BUFFER_SWAPS, 1);

        state.sample_count += sample_count.swap(0.0, Ordering::AcqRel);
        full_buffer.set_queued();
        state.full[tile_index][buffer_group].push(Arc::clone(&full_buffer));

        if self.splatting_tile[tile_index].fetch_add(1, Ordering::AcqRel) > 0 {
            // Someone else is splatting the tile; keep rendering into an empty buffer.
            if let Some(buffer) = state.free.pop() {
                slot.store(buffer);
                return;
            }

            state.splatting_misses += 1;
            stat_inc!(BUFFER_MISSES, 1);
            let max_misses = self.config.max_buffer_misses(self.tile_count);
            if state.splatting_misses < max_misses {
                slot.store(self.new_buffer());
                return;
            }
            if state.splatting_misses > self.config.miss_reset_threshold {
                state.splatting_misses = max_misses;
            }

            // Out of buffers; wait for the current splatter and splat ourselves.
        }

        let mut splat_buffers: Vec<Arc<Buffer>> = state.full[tile_index]
            .iter_mut()
            .flat_map(|group| group.drain(..))
            .collect();

        let main_guard = self.main_splatting.lock().unwrap();

        let count = std::mem::take(&mut state.sample_count);
        drop(state);

        self.film.add_sample_count(count as f64);

        let tile_guard = self.tile_splatting[tile_index].lock().unwrap();
        drop(main_guard);

        stat_inc!(TILE_SPLATS, 1);
        for buffer in splat_buffers.iter() {
            buffer.splat(self.film.as_ref(), tile_index);
        }
        self.splatting_tile[tile_index].store(0, Ordering::Release);

        drop(tile_guard);

        // The slot keeps the buffer handed in above, now empty; the rest become free.
        splat_buffers.retain(|buffer| !Arc::ptr_eq(buffer, &full_buffer));
        if !splat_buffers.is_empty() {
            self.state.lock().unwrap().free.append(&mut splat_buffers);
        }
    }

    /// Hands every buffer owned by a producer to the pool without splatting, along with the
    /// producer's pending sample count. Called when a `ContributionBuffer` is dropped.
    ///
    /// * `contrib_buffer` - The producer.
    pub fn end(&self, contrib_buffer: &ContributionBuffer) {
        let mut state = self.state.lock().unwrap();

        for (tile_index, groups) in contrib_buffer.slots().iter().enumerate() {
            for (buffer_group, slot) in groups.iter().enumerate() {
                let buffer = slot.load_full();
                buffer.set_queued();
                state.full[tile_index][buffer_group].push(buffer);
            }
        }

        state.sample_count += contrib_buffer.take_sample_count();
    }

    /// Splats every full buffer into the film and returns it to the free list. Also reports pending
    /// samples to the film. Must not be called while producers are active.
    pub fn flush(&self) {
        let mut state = self.state.lock().unwrap();

        let mut flushed = 0;
        for tile_index in 0..self.tile_count {
            let buffers: Vec<Arc<Buffer>> = state.full[tile_index]
                .iter_mut()
                .flat_map(|group| group.drain(..))
                .collect();

            for buffer in buffers {
                buffer.splat(self.film.as_ref(), tile_index);
                state.free.push(buffer);
                flushed += 1;
            }
        }

        let count = std::mem::take(&mut state.sample_count);
        if count != 0.0 {
            self.film.add_sample_count(count as f64);
        }

        debug!("Flushed {} contribution buffers", flushed);
    }

    /// Flushes the pool and releases every free buffer. Must be called once all producers have
    /// ended. Calling it again does nothing.
    pub fn delete(&self) {
        self.flush();

        let mut state = self.state.lock().unwrap();
        let released = state.free.len();
        let stray = state.free.iter().filter(|b| !b.is_empty()).count();
        if stray > 0 {
            warn!(
                "Releasing {} contribution buffers written after their splat",
                stray
            );
        }
        state.free.clear();
        state.free.shrink_to_fit();
        self.allocated.fetch_sub(released, Ordering::AcqRel);

        if released > 0 {
            debug!("Released {} contribution buffers", released);
        }
    }
}

impl Drop for ContributionPool {
    fn drop(&mut self) {
        if let Ok(state) = self.state.get_mut() {
            let pending: usize = state.full.iter().flatten().map(|g| g.len()).sum();
            if pending > 0 {
                warn!(
                    "Contribution pool dropped with {} unsplatted buffers",
                    pending
                );
            }
        }
    }
}
