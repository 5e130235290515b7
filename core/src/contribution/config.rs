//! Contribution pool configuration

/// Default capacity of a contribution `Buffer`.
pub const CONTRIB_BUF_SIZE: usize = 1024;

/// Minimum number of buffers to keep alive for reuse. In practice twice this amount stays allocated.
pub const CONTRIB_BUF_KEEPALIVE: usize = 1;

/// Default multiplier of the tile count that caps buffer allocations forced by an empty free list.
pub const CONTRIB_BUF_MISS_MULTIPLIER: usize = 32;

/// Default number of buffer swaps a producer attempts before dropping a contribution.
pub const CONTRIB_MAX_RETRIES: usize = 10;

/// Buffer miss count above which the counter is reset to the cap.
pub const CONTRIB_MISS_RESET_THRESHOLD: usize = 1_000_000;

/// Tunables for `ContributionPool`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of contributions a single buffer holds.
    pub buffer_size: usize,

    /// Number of free buffers allocated up front.
    pub keepalive: usize,

    /// Buffer misses allowed per tile before producers fall back to splatting themselves.
    pub miss_multiplier: usize,

    /// Number of buffer swaps attempted for one contribution.
    pub max_retries: usize,

    /// Buffer miss count above which the miss counter is reset to the cap.
    pub miss_reset_threshold: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            buffer_size: CONTRIB_BUF_SIZE,
            keepalive: CONTRIB_BUF_KEEPALIVE,
            miss_multiplier: CONTRIB_BUF_MISS_MULTIPLIER,
            max_retries: CONTRIB_MAX_RETRIES,
            miss_reset_threshold: CONTRIB_MISS_RESET_THRESHOLD,
        }
    }
}

impl PoolConfig {
    /// Returns a configuration with the given buffer size and defaults otherwise.
    ///
    /// * `buffer_size` - Number of contributions a single buffer holds.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..Default::default()
        }
    }

    /// Returns the maximum number of buffers allocated because the free list was empty.
    ///
    /// * `tile_count` - Number of film tiles.
    pub fn max_buffer_misses(&self, tile_count: usize) -> usize {
        tile_count * self.miss_multiplier
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.buffer_size == 0 {
            return Err("Contribution buffer size must be at least 1.".to_string());
        }
        if self.buffer_size > u32::MAX as usize / 2 {
            return Err(format!(
                "Contribution buffer size {} is too large.",
                self.buffer_size
            ));
        }
        if self.max_retries == 0 {
            return Err("Contribution buffer retries must be at least 1.".to_string());
        }
        if self.miss_reset_threshold < self.miss_multiplier {
            return Err(format!(
                "Buffer miss reset threshold {} is below the miss multiplier {}.",
                self.miss_reset_threshold, self.miss_multiplier
            ));
        }
        Ok(())
    }
}
