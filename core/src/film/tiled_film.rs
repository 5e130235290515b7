//! Tiled Film

use super::*;
use crate::contribution::ScopedPoolLock;
use crate::filter::*;
use crate::parallel::AtomicDouble;
use crate::pbrt::*;
use crate::spectrum::*;
use crate::{stat_counter, stat_inc, stat_memory_counter, stat_register_fns};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

stat_counter!(
    "Film/Contributions accumulated",
    FILM_CONTRIBUTIONS,
    film_stats_contributions
);
stat_counter!(
    "Film/Contributions rejected",
    FILM_REJECTED,
    film_stats_rejected
);
stat_memory_counter!("Memory/Film pixels", FILM_PIXEL_MEMORY, film_stats_pixels);

stat_register_fns!(film_stats_contributions, film_stats_rejected, film_stats_pixels);

/// Pixel storage for the rows of one tile.
struct TileStorage {
    /// First row of the tile.
    row_start: usize,

    /// Number of rows in the tile.
    rows: usize,

    /// Pixels indexed by `[group][buffer][row][column]`.
    pixels: Vec<Pixel>,

    /// Depths indexed by `[row][column]`. Empty if the z-buffer is disabled.
    depths: Vec<DepthPixel>,
}

/// Copy of the film's pixels with the buffers of every group summed up.
#[derive(Clone, Debug)]
pub struct FilmSnapshot {
    /// First pixel column.
    pub x_start: usize,

    /// First pixel row.
    pub y_start: usize,

    /// Number of columns.
    pub width: usize,

    /// Number of rows.
    pub height: usize,

    /// Pixels in row-major order per buffer group.
    pub groups: Vec<Vec<Pixel>>,

    /// Number of samples taken when the snapshot was made.
    pub sample_count: f64,
}

impl FilmSnapshot {
    /// Returns a pixel of a buffer group. Coordinates are relative to the crop window.
    ///
    /// * `group` - Buffer group.
    /// * `x`     - Column.
    /// * `y`     - Row.
    pub fn pixel(&self, group: usize, x: usize, y: usize) -> &Pixel {
        &self.groups[group][y * self.width + x]
    }
}

/// A film partitioned into horizontal slab tiles, each guarded by its own mutex. Contributions are
/// reconstructed with a tabulated filter into one of several buffers per buffer group.
pub struct TiledFilm {
    /// Configuration.
    config: FilmConfig,

    /// Reconstruction filter.
    filter: ArcFilter,

    /// Tabulated reconstruction filter.
    filter_table: FilterTable,

    /// First pixel column inside the crop window.
    x_start: usize,

    /// Number of pixel columns inside the crop window.
    x_count: usize,

    /// First pixel row inside the crop window.
    y_start: usize,

    /// Number of pixel rows inside the crop window.
    y_count: usize,

    /// Tile layout.
    tiling: SlabTiling,

    /// Pixel storage per tile.
    tiles: Vec<Mutex<TileStorage>>,

    /// Samples taken per buffer group.
    group_sample_counts: Vec<AtomicDouble>,

    /// Samples taken.
    sample_count: AtomicDouble,

    /// Set once a buffer group reaches the halt samples per pixel.
    enough_samples: AtomicBool,

    /// Contributions accumulated into pixels, counted per tile they were delivered to.
    received: AtomicU64,

    /// Contributions skipped because of invalid values, counted per tile they were delivered to.
    rejected: AtomicU64,

    /// Number of periodic output checks.
    output_checks: AtomicUsize,
}

impl TiledFilm {
    /// Create a new `TiledFilm`.
    ///
    /// * `config` - Configuration.
    /// * `filter` - Reconstruction filter.
    pub fn new(config: FilmConfig, filter: ArcFilter) -> Result<Self, String> {
        register_stats();
        config.validate()?;

        let radius = filter.get_data().radius;
        if !(radius.x > 0.0 && radius.y > 0.0 && radius.x.is_finite() && radius.y.is_finite()) {
            return Err(format!("Invalid filter radius {}.", radius));
        }

        let (x_start, x_count) = config.x_pixels();
        let (y_start, y_count) = config.y_pixels();
        let tiling = SlabTiling::new(y_start, y_count, radius.y, config.requested_tile_count());

        let buffers = config.buffer_groups * config.buffers_per_group;
        let tiles: Vec<Mutex<TileStorage>> = (0..tiling.tile_count())
            .map(|t| {
                let (row_start, row_end) = tiling.tile_rows(t);
                let rows = row_end - row_start;
                Mutex::new(TileStorage {
                    row_start,
                    rows,
                    pixels: vec![Pixel::default(); buffers * rows * x_count],
                    depths: if config.use_zbuffer {
                        vec![DepthPixel::default(); rows * x_count]
                    } else {
                        vec![]
                    },
                })
            })
            .collect();

        let pixel_count = x_count * y_count;
        let mut memory = buffers * pixel_count * std::mem::size_of::<Pixel>();
        if config.use_zbuffer {
            memory += pixel_count * std::mem::size_of::<DepthPixel>();
        }
        stat_inc!(FILM_PIXEL_MEMORY, memory as u64);

        info!(
            "Film {}x{} ({}x{} cropped), {} tiles, {} buffer groups",
            config.x_resolution,
            config.y_resolution,
            x_count,
            y_count,
            tiling.tile_count(),
            config.buffer_groups
        );

        Ok(Self {
            filter_table: FilterTable::new(filter.as_ref()),
            filter,
            x_start,
            x_count,
            y_start,
            y_count,
            tiling,
            tiles,
            group_sample_counts: (0..config.buffer_groups)
                .map(|_| AtomicDouble::new(0.0))
                .collect(),
            sample_count: AtomicDouble::new(0.0),
            enough_samples: AtomicBool::new(false),
            received: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            output_checks: AtomicUsize::new(0),
            config,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FilmConfig {
        &self.config
    }

    /// Returns the reconstruction filter.
    pub fn filter(&self) -> &ArcFilter {
        &self.filter
    }

    /// Returns the tile layout.
    pub fn tiling(&self) -> &SlabTiling {
        &self.tiling
    }

    /// Returns the number of pixels inside the crop window.
    pub fn pixel_count(&self) -> usize {
        self.x_count * self.y_count
    }

    /// Returns the pixel bounds of a tile as `(x_start, x_end, y_start, y_end)`; ends are
    /// exclusive.
    ///
    /// * `tile_index` - The tile.
    pub fn tile_extent(&self, tile_index: usize) -> (usize, usize, usize, usize) {
        let (y0, y1) = self.tiling.tile_rows(tile_index);
        (self.x_start, self.x_start + self.x_count, y0, y1)
    }

    /// Returns the number of samples taken.
    pub fn sample_count(&self) -> f64 {
        self.sample_count.load(Ordering::Acquire)
    }

    /// Returns the number of samples taken for a buffer group.
    ///
    /// * `group` - Buffer group.
    pub fn group_sample_count(&self, group: usize) -> f64 {
        self.group_sample_counts[group].load(Ordering::Acquire)
    }

    /// Returns the number of samples taken per pixel.
    pub fn samples_per_pixel(&self) -> f64 {
        self.sample_count() / self.pixel_count() as f64
    }

    /// Returns the number of accumulated contributions, counting straddling contributions once
    /// per tile.
    pub fn contributions_received(&self) -> u64 {
        self.received.load(Ordering::Acquire)
    }

    /// Returns the number of skipped contributions, counting straddling contributions once per
    /// tile.
    pub fn contributions_rejected(&self) -> u64 {
        self.rejected.load(Ordering::Acquire)
    }

    /// Returns the number of periodic output checks.
    pub fn output_checks(&self) -> usize {
        self.output_checks.load(Ordering::Acquire)
    }

    /// Returns a pixel of a buffer or `None` if the coordinates are outside the crop window or the
    /// buffer does not exist.
    ///
    /// * `group`  - Buffer group.
    /// * `buffer` - Buffer within the group.
    /// * `x`      - Image column.
    /// * `y`      - Image row.
    pub fn pixel(&self, group: usize, buffer: usize, x: usize, y: usize) -> Option<Pixel> {
        if group >= self.config.buffer_groups || buffer >= self.config.buffers_per_group {
            return None;
        }
        let (tile_index, column) = self.locate(x, y)?;
        let storage = self.tiles[tile_index].lock().unwrap();
        let i = self.pixel_index(&storage, group, buffer, column, y);
        Some(storage.pixels[i])
    }

    /// Returns the normalized color of a pixel or `None` if the pixel does not exist.
    ///
    /// * `group`  - Buffer group.
    /// * `buffer` - Buffer within the group.
    /// * `x`      - Image column.
    /// * `y`      - Image row.
    pub fn weighted_xyz(&self, group: usize, buffer: usize, x: usize, y: usize) -> Option<XYZColor> {
        self.pixel(group, buffer, x, y).map(|p| p.weighted_xyz())
    }

    /// Returns the average depth of a pixel or `None` if the pixel does not exist or the z-buffer
    /// is disabled.
    ///
    /// * `x` - Image column.
    /// * `y` - Image row.
    pub fn zdepth(&self, x: usize, y: usize) -> Option<Float> {
        if !self.config.use_zbuffer {
            return None;
        }
        let (tile_index, column) = self.locate(x, y)?;
        let storage = self.tiles[tile_index].lock().unwrap();
        let row = y - storage.row_start;
        Some(storage.depths[row * self.x_count + column].depth())
    }

    /// Copies the pixels with the buffers of every group summed up. Holding the pool lock keeps
    /// splatters from starting on a tile while the copy is made.
    ///
    /// * `_lock` - The pool lock.
    pub fn snapshot(&self, _lock: &ScopedPoolLock) -> FilmSnapshot {
        let groups = self.config.buffer_groups;
        let buffers = self.config.buffers_per_group;
        let mut snapshot = FilmSnapshot {
            x_start: self.x_start,
            y_start: self.y_start,
            width: self.x_count,
            height: self.y_count,
            groups: vec![vec![Pixel::default(); self.pixel_count()]; groups],
            sample_count: self.sample_count(),
        };

        for tile in self.tiles.iter() {
            let storage = tile.lock().unwrap();
            let plane = storage.rows * self.x_count;
            let offset = (storage.row_start - self.y_start) * self.x_count;
            for (group, dst) in snapshot.groups.iter_mut().enumerate() {
                for buffer in 0..buffers {
                    let src = &storage.pixels[(group * buffers + buffer) * plane..][..plane];
                    for (d, s) in dst[offset..offset + plane].iter_mut().zip(src) {
                        d.merge(s);
                    }
                }
            }
        }

        snapshot
    }

    /// Returns the tile and crop relative column of an image pixel.
    fn locate(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        if x < self.x_start
            || x >= self.x_start + self.x_count
            || y < self.y_start
            || y >= self.y_start + self.y_count
        {
            return None;
        }
        let tile_index = (y - self.y_start) / self.tiling.tile_height();
        Some((tile_index, x - self.x_start))
    }

    /// Returns the index into a tile's pixels.
    #[inline]
    fn pixel_index(
        &self,
        storage: &TileStorage,
        group: usize,
        buffer: usize,
        column: usize,
        y: usize,
    ) -> usize {
        let plane = (group * self.config.buffers_per_group + buffer) * storage.rows;
        (plane + y - storage.row_start) * self.x_count + column
    }
}

impl Film for TiledFilm {
    fn tile_count(&self) -> usize {
        self.tiling.tile_count()
    }

    fn buffer_group_count(&self) -> usize {
        self.config.buffer_groups
    }

    fn tile_indexes(&self, contrib: &Contribution) -> TileSpan {
        self.tiling.tile_indexes(contrib.image_y)
    }

    fn add_tile_samples(&self, contribs: &[Contribution], tile_index: usize) {
        let (x_tile_start, x_tile_end, y_tile_start, y_tile_end) = self.tile_extent(tile_index);
        let radius = self.filter_table.data().radius;

        let mut storage = self.tiles[tile_index].lock().unwrap();
        let mut accepted = 0_u64;
        let mut rejected = 0_u64;

        for contrib in contribs.iter() {
            let weight = contrib.variance;
            if !is_finite_non_negative(contrib.color.y())
                || !is_finite_non_negative(contrib.alpha)
                || !is_finite_non_negative(weight)
            {
                rejected += 1;
                continue;
            }

            let group = contrib.buffer_group as usize;
            let buffer = contrib.buffer as usize;
            if group >= self.config.buffer_groups || buffer >= self.config.buffers_per_group {
                warn!(
                    "Contribution for missing buffer {} of group {} discarded",
                    buffer, group
                );
                rejected += 1;
                continue;
            }

            let xyz = if self.config.premultiply_alpha {
                contrib.color * contrib.alpha
            } else {
                contrib.color
            };

            // Compute the sample's raster extent.
            let dx = contrib.image_x - 0.5;
            let dy = contrib.image_y - 0.5;
            let x0 = (dx - radius.x).ceil() as i64;
            let x1 = (dx + radius.x).floor() as i64 + 1;
            let y0 = (dy - radius.y).ceil() as i64;
            let y1 = (dy + radius.y).floor() as i64 + 1;

            let xs = max(x0, x_tile_start as i64);
            let xe = min(x1, x_tile_end as i64);
            let ys = max(y0, y_tile_start as i64);
            let ye = min(y1, y_tile_end as i64);

            for y in ys..ye {
                for x in xs..xe {
                    let filter_weight = self.filter_table.lookup(x as Float - dx, y as Float - dy);
                    let column = x as usize - self.x_start;
                    let i = self.pixel_index(&storage, group, buffer, column, y as usize);
                    storage.pixels[i].add(&xyz, contrib.alpha, filter_weight * weight);

                    if self.config.use_zbuffer && contrib.zdepth != 0.0 {
                        let row = y as usize - storage.row_start;
                        storage.depths[row * self.x_count + column].add(contrib.zdepth, 1.0);
                    }
                }
            }

            accepted += 1;
        }

        drop(storage);

        self.received.fetch_add(accepted, Ordering::AcqRel);
        self.rejected.fetch_add(rejected, Ordering::AcqRel);
        stat_inc!(FILM_CONTRIBUTIONS, accepted as i64);
        stat_inc!(FILM_REJECTED, rejected as i64);
    }

    fn add_sample_count(&self, count: f64) {
        self.sample_count.add(count);

        let halt = self.config.halt_spp as f64 * self.pixel_count() as f64;
        for group in self.group_sample_counts.iter() {
            let n = group.add(count) + count;
            if self.config.halt_spp > 0 && n >= halt {
                self.enough_samples.store(true, Ordering::Release);
            }
        }
    }

    fn enough_samples(&self) -> bool {
        self.enough_samples.load(Ordering::Acquire)
    }

    fn check_write_output_interval(&self) {
        self.output_checks.fetch_add(1, Ordering::AcqRel);
        debug!(
            "Film: {:.2} samples per pixel, {} contributions, {} rejected",
            self.samples_per_pixel(),
            self.contributions_received(),
            self.contributions_rejected()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::{ContributionBuffer, ContributionPool, PoolConfig};
    use crate::geometry::*;
    use crate::rng::RNG;
    use float_cmp::approx_eq;
    use std::sync::Arc;

    struct BoxFilter {
        data: FilterData,
    }

    impl Filter for BoxFilter {
        fn get_data(&self) -> &FilterData {
            &self.data
        }

        fn evaluate(&self, _p: &Point2f) -> Float {
            1.0
        }
    }

    fn box_filter(radius: Float) -> ArcFilter {
        Arc::new(BoxFilter {
            data: FilterData::new(Vector2f::new(radius, radius)),
        })
    }

    fn contrib(x: Float, y: Float, weight: Float) -> Contribution {
        Contribution::new(x, y, XYZColor::new(1.0, 2.0, 3.0), 1.0, 0.0, weight, 0, 0)
    }

    fn film(config: FilmConfig) -> TiledFilm {
        TiledFilm::new(config, box_filter(0.5)).unwrap()
    }

    #[test]
    fn sample_lands_in_its_pixel() {
        let film = film(FilmConfig::with_resolution(8, 8));
        film.add_sample(&contrib(3.5, 2.5, 2.0));

        let p = film.pixel(0, 0, 3, 2).unwrap();
        assert_eq!(p.weight_sum, 2.0);
        assert_eq!(film.weighted_xyz(0, 0, 3, 2), Some(XYZColor::new(1.0, 2.0, 3.0)));
        assert_eq!(film.pixel(0, 0, 4, 2).unwrap().weight_sum, 0.0);
        assert_eq!(film.contributions_received(), 1);
    }

    #[test]
    fn wide_filter_spreads_over_neighbours() {
        let film = TiledFilm::new(FilmConfig::with_resolution(8, 8), box_filter(1.0)).unwrap();
        film.add_sample(&contrib(4.0, 4.0, 1.0));

        // Pixel centers 3.5 and 4.5 are within the radius, 2.5 and 5.5 are not.
        for (x, y) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
            assert_eq!(film.pixel(0, 0, x, y).unwrap().weight_sum, 1.0);
        }
        assert_eq!(film.pixel(0, 0, 2, 4).unwrap().weight_sum, 0.0);
        assert_eq!(film.pixel(0, 0, 5, 4).unwrap().weight_sum, 0.0);
    }

    #[test]
    fn invalid_contributions_are_rejected() {
        let film = film(FilmConfig::with_resolution(4, 4));
        let mut c = contrib(1.5, 1.5, 1.0);
        c.color = XYZColor::new(0.0, Float::NAN, 0.0);
        film.add_sample(&c);

        let mut c = contrib(1.5, 1.5, 1.0);
        c.alpha = Float::INFINITY;
        film.add_sample(&c);

        let mut c = contrib(1.5, 1.5, 1.0);
        c.reject();
        film.add_sample(&c);

        let mut c = contrib(1.5, 1.5, 1.0);
        c.buffer_group = 3;
        film.add_sample(&c);

        assert_eq!(film.contributions_rejected(), 4);
        assert_eq!(film.contributions_received(), 0);
        assert_eq!(film.pixel(0, 0, 1, 1).unwrap().weight_sum, 0.0);
    }

    #[test]
    fn samples_outside_crop_window_are_clipped() {
        let config = FilmConfig {
            crop_window: [0.5, 1.0, 0.5, 1.0],
            ..FilmConfig::with_resolution(8, 8)
        };
        let film = film(config);
        film.add_sample(&contrib(1.5, 1.5, 1.0));
        film.add_sample(&contrib(5.5, 5.5, 1.0));

        assert_eq!(film.pixel(0, 0, 1, 1), None);
        assert_eq!(film.pixel(0, 0, 5, 5).unwrap().weight_sum, 1.0);
        assert_eq!(film.pixel_count(), 16);
    }

    #[test]
    fn premultiplied_alpha() {
        let config = FilmConfig {
            premultiply_alpha: true,
            ..FilmConfig::with_resolution(4, 4)
        };
        let film = film(config);
        let mut c = contrib(0.5, 0.5, 1.0);
        c.alpha = 0.5;
        film.add_sample(&c);

        let p = film.pixel(0, 0, 0, 0).unwrap();
        assert_eq!(p.xyz, XYZColor::new(0.5, 1.0, 1.5));
        assert_eq!(p.weighted_alpha(), 0.5);
    }

    #[test]
    fn zbuffer_averages_nonzero_depths() {
        let config = FilmConfig {
            use_zbuffer: true,
            ..FilmConfig::with_resolution(4, 4)
        };
        let film = film(config);
        for z in [0.0, 2.0, 4.0] {
            let mut c = contrib(2.5, 2.5, 1.0);
            c.zdepth = z;
            film.add_sample(&c);
        }
        assert_eq!(film.zdepth(2, 2), Some(3.0));
        assert_eq!(film.zdepth(0, 0), Some(0.0));
    }

    #[test]
    fn buffers_and_groups_are_separate() {
        let config = FilmConfig {
            buffer_groups: 2,
            buffers_per_group: 2,
            ..FilmConfig::with_resolution(4, 4)
        };
        let film = film(config);
        let mut c = contrib(1.5, 1.5, 1.0);
        c.buffer_group = 1;
        c.buffer = 1;
        film.add_sample(&c);

        assert_eq!(film.pixel(1, 1, 1, 1).unwrap().weight_sum, 1.0);
        assert_eq!(film.pixel(0, 0, 1, 1).unwrap().weight_sum, 0.0);
        assert_eq!(film.pixel(1, 0, 1, 1).unwrap().weight_sum, 0.0);
        assert_eq!(film.pixel(2, 0, 1, 1), None);
    }

    #[test]
    fn straddling_contribution_is_split_between_tiles() {
        let config = FilmConfig {
            tile_count: 2,
            ..FilmConfig::with_resolution(4, 8)
        };
        let film = TiledFilm::new(config, box_filter(1.0)).unwrap();
        assert_eq!(film.tile_count(), 2);
        assert_eq!(film.tile_extent(1), (0, 4, 4, 8));

        let c = contrib(2.0, 4.0, 1.0);
        assert_eq!(film.tile_indexes(&c), TileSpan::pair(0, 1));
        film.add_sample(&c);

        assert_eq!(film.pixel(0, 0, 1, 3).unwrap().weight_sum, 1.0);
        assert_eq!(film.pixel(0, 0, 1, 4).unwrap().weight_sum, 1.0);
        assert_eq!(film.contributions_received(), 2);
    }

    #[test]
    fn halt_samples_per_pixel() {
        let config = FilmConfig {
            halt_spp: 2,
            buffer_groups: 2,
            ..FilmConfig::with_resolution(4, 4)
        };
        let film = film(config);
        film.add_sample_count(16.0);
        assert!(!film.enough_samples());
        assert_eq!(film.samples_per_pixel(), 1.0);

        film.add_sample_count(16.0);
        assert!(film.enough_samples());
        assert_eq!(film.group_sample_count(1), 32.0);
        assert_eq!(film.sample_count(), 32.0);
    }

    #[test]
    fn zero_halt_never_stops() {
        let film = film(FilmConfig::with_resolution(2, 2));
        film.add_sample_count(1e9);
        assert!(!film.enough_samples());
    }

    #[test]
    fn image_is_independent_of_contribution_order() {
        let config = FilmConfig {
            tile_count: 4,
            ..FilmConfig::with_resolution(16, 16)
        };
        let a = TiledFilm::new(config.clone(), box_filter(1.5)).unwrap();
        let b = TiledFilm::new(config, box_filter(1.5)).unwrap();

        let mut rng = RNG::new(7);
        let mut contribs: Vec<Contribution> = (0..500)
            .map(|_| {
                let x = rng.uniform_float() * 16.0;
                let y = rng.uniform_float() * 16.0;
                let v = rng.uniform_float();
                Contribution::new(x, y, XYZColor::splat(v), 1.0, 0.0, 1.0, 0, 0)
            })
            .collect();

        for c in contribs.iter() {
            a.add_sample(c);
        }
        rng.shuffle(&mut contribs);
        for c in contribs.iter() {
            b.add_sample(c);
        }

        for y in 0..16 {
            for x in 0..16 {
                let pa = a.pixel(0, 0, x, y).unwrap();
                let pb = b.pixel(0, 0, x, y).unwrap();
                assert!(approx_eq!(f32, pa.weight_sum, pb.weight_sum, epsilon = 1e-3));
                assert!(approx_eq!(f32, pa.xyz[1], pb.xyz[1], epsilon = 1e-3));
            }
        }
    }

    #[test]
    fn pooled_rendering_matches_direct_rendering() {
        let config = FilmConfig {
            tile_count: 3,
            ..FilmConfig::with_resolution(12, 12)
        };
        let direct = TiledFilm::new(config.clone(), box_filter(1.0)).unwrap();
        let pooled = Arc::new(TiledFilm::new(config, box_filter(1.0)).unwrap());
        let pool = Arc::new(
            ContributionPool::new(pooled.clone(), PoolConfig::with_buffer_size(8)).unwrap(),
        );

        let mut rng = RNG::new(3);
        let contribs: Vec<Contribution> = (0..400)
            .map(|_| {
                let x = rng.uniform_float() * 12.0;
                let y = rng.uniform_float() * 12.0;
                Contribution::new(x, y, XYZColor::splat(1.0), 1.0, 0.0, 0.0, 0, 0)
            })
            .collect();

        crossbeam::scope(|scope| {
            for chunk in contribs.chunks(100) {
                let pool = Arc::clone(&pool);
                scope.spawn(move |_| {
                    let cb = ContributionBuffer::new(pool);
                    for c in chunk {
                        cb.add(c, 1.0);
                    }
                });
            }
        })
        .unwrap();
        pool.flush();

        for c in contribs.iter() {
            let mut c = *c;
            c.variance = 1.0;
            direct.add_sample(&c);
        }

        assert_eq!(pooled.contributions_received(), direct.contributions_received());
        for y in 0..12 {
            for x in 0..12 {
                let a = direct.pixel(0, 0, x, y).unwrap().weight_sum;
                let b = pooled.pixel(0, 0, x, y).unwrap().weight_sum;
                assert!(approx_eq!(f32, a, b, epsilon = 1e-3));
            }
        }
    }

    #[test]
    fn snapshot_sums_buffers_of_each_group() {
        let config = FilmConfig {
            buffers_per_group: 2,
            tile_count: 2,
            ..FilmConfig::with_resolution(4, 4)
        };
        let film = Arc::new(film(config));
        let pool = ContributionPool::new(film.clone(), PoolConfig::default()).unwrap();

        let mut c = contrib(1.5, 3.5, 1.0);
        film.add_sample(&c);
        c.buffer = 1;
        film.add_sample(&c);
        film.add_sample_count(5.0);

        let lock = ScopedPoolLock::new(&pool);
        let snapshot = film.snapshot(&lock);
        assert_eq!(snapshot.width, 4);
        assert_eq!(snapshot.height, 4);
        assert_eq!(snapshot.pixel(0, 1, 3).weight_sum, 2.0);
        assert_eq!(snapshot.pixel(0, 1, 2).weight_sum, 0.0);
        assert_eq!(snapshot.sample_count, 5.0);
    }

    #[test]
    fn rejects_invalid_filter() {
        assert!(TiledFilm::new(FilmConfig::default(), box_filter(0.0)).is_err());
    }
}
