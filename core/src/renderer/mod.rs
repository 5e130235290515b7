//! Renderer

mod interval;
mod progress;

use crate::contribution::*;
use crate::report_stats;
use crate::rng::RNG;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Re-export.
pub use interval::*;
pub use progress::*;

/// Produces contributions for units of work called tasks.
pub trait ContributionSource: Send + Sync {
    /// Renders one task and adds its contributions and sample counts to `contribs`.
    ///
    /// * `task`     - Task index.
    /// * `rng`      - The worker's random number generator.
    /// * `contribs` - The worker's contribution buffer.
    fn sample(&self, task: usize, rng: &mut RNG, contribs: &ContributionBuffer);
}

/// Render loop settings.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// Number of worker threads.
    pub threads: usize,

    /// Number of tasks to render.
    pub tasks: usize,

    /// Time between output writes. `None` disables periodic writes.
    pub write_interval: Option<Duration>,

    /// Hide the progress bar.
    pub quiet: bool,

    /// Seed for the workers' random number generators.
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            tasks: 0,
            write_interval: None,
            quiet: false,
            seed: 0,
        }
    }
}

/// Outcome of a render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSummary {
    /// Number of tasks rendered.
    pub tasks_completed: usize,

    /// `true` if the film asked to stop before every task was rendered.
    pub stopped_early: bool,

    /// Number of periodic output writes.
    pub writes: usize,

    /// Wall clock time.
    pub elapsed: Duration,
}

/// Renders every task of a source on a pool of worker threads. Each worker feeds its own
/// `ContributionBuffer`. If a write interval is set, `on_write` is called periodically while the
/// pool is locked, and once more at the end. The pool is flushed and deleted before returning.
///
/// * `pool`     - The contribution pool.
/// * `source`   - The contribution source.
/// * `settings` - Render loop settings.
/// * `on_write` - Output callback.
pub fn render<S, W>(
    pool: &Arc<ContributionPool>,
    source: &S,
    settings: &RenderSettings,
    on_write: W,
) -> Result<RenderSummary, String>
where
    S: ContributionSource + ?Sized,
    W: Fn(&ContributionPool, &ScopedPoolLock) + Send + Sync,
{
    if settings.threads == 0 {
        return Err("Render thread count must be at least 1.".to_string());
    }

    let start = Instant::now();
    let threads = settings.threads;
    let completed = AtomicUsize::new(0);
    let writes = AtomicUsize::new(0);
    let mut stopped_early = false;
    let mut worker_panicked = false;

    info!("Rendering {} tasks on {} threads", settings.tasks, threads);

    let progress = create_progress_reporter(settings.tasks as u64, settings.quiet);
    progress.set_message("Rendering");

    let scoped = crossbeam::scope(|scope| {
        let (tx, rx) = crossbeam_channel::bounded(threads);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

        // Periodic output writer.
        if let Some(interval) = settings.write_interval {
            let pool: &ContributionPool = pool;
            let on_write = &on_write;
            let writes = &writes;
            scope.spawn(move |_| {
                let checker = WriteIntervalChecker::new(interval, stop_rx);
                let calls = checker.run(|| {
                    pool.film().check_write_output_interval();
                    let lock = ScopedPoolLock::new(pool);
                    on_write(pool, &lock);
                });
                writes.fetch_add(calls, Ordering::AcqRel);
            });
        }

        // Spawn worker threads.
        let workers: Vec<_> = (0..threads)
            .map(|thread_index| {
                let rxc = rx.clone();
                let pool = Arc::clone(pool);
                let progress = &progress;
                let completed = &completed;
                let seed = settings.seed.wrapping_add(thread_index as u64);
                scope.spawn(move |_| {
                    let mut rng = RNG::new(seed);
                    let contribs = ContributionBuffer::new(pool);

                    for task in rxc.iter() {
                        if contribs.pool().film().enough_samples() {
                            continue;
                        }
                        source.sample(task, &mut rng, &contribs);
                        completed.fetch_add(1, Ordering::AcqRel);
                        progress.inc(1);
                    }

                    // Hand remaining contributions to the pool.
                    drop(contribs);

                    report_stats!();
                })
            })
            .collect();
        drop(rx); // Drop extra rx since we've cloned one for each worker.

        // Send work.
        for task in 0..settings.tasks {
            if pool.film().enough_samples() {
                stopped_early = true;
                break;
            }
            if tx.send(task).is_err() {
                break;
            }
        }
        drop(tx);

        for worker in workers {
            if worker.join().is_err() {
                worker_panicked = true;
            }
        }

        // Stop the output writer.
        drop(stop_tx);
    });

    if scoped.is_err() || worker_panicked {
        progress.abandon_with_message("Render failed");
        return Err("A render thread panicked.".to_string());
    }

    pool.flush();
    pool.delete();

    if settings.write_interval.is_some() {
        let lock = ScopedPoolLock::new(pool);
        on_write(pool, &lock);
        writes.fetch_add(1, Ordering::AcqRel);
    }

    report_stats!();

    let summary = RenderSummary {
        tasks_completed: completed.load(Ordering::Acquire),
        stopped_early: stopped_early || pool.film().enough_samples(),
        writes: writes.load(Ordering::Acquire),
        elapsed: start.elapsed(),
    };

    progress.finish_with_message("Render complete");
    info!(
        "Rendered {} of {} tasks in {:.2?}",
        summary.tasks_completed, settings.tasks, summary.elapsed
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::film::*;
    use crate::filter::*;
    use crate::geometry::*;
    use crate::pbrt::*;
    use crate::spectrum::XYZColor;

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

    /// One sample per pixel of a row per task.
    struct RowSource {
        width: usize,
        height: usize,
    }

    impl ContributionSource for RowSource {
        fn sample(&self, task: usize, rng: &mut RNG, contribs: &ContributionBuffer) {
            let y = (task % self.height) as Float;
            for x in 0..self.width {
                let c = Contribution::new(
                    x as Float + rng.uniform_float(),
                    y + rng.uniform_float(),
                    XYZColor::splat(1.0),
                    1.0,
                    0.0,
                    0.0,
                    0,
                    0,
                );
                contribs.add(&c, 1.0);
            }
            contribs.add_sample_count(self.width as Float);
        }
    }

    fn setup(halt_spp: u32) -> (Arc<TiledFilm>, Arc<ContributionPool>) {
        let config = FilmConfig {
            tile_count: 4,
            thread_count: 4,
            halt_spp,
            ..FilmConfig::with_resolution(16, 16)
        };
        let filter: ArcFilter = Arc::new(BoxFilter {
            data: FilterData::new(Vector2f::new(0.5, 0.5)),
        });
        let film = Arc::new(TiledFilm::new(config, filter).unwrap());
        let pool = ContributionPool::new(film.clone(), PoolConfig::with_buffer_size(16)).unwrap();
        (film, Arc::new(pool))
    }

    #[test]
    fn renders_every_task() {
        let (film, pool) = setup(0);
        let source = RowSource {
            width: 16,
            height: 16,
        };
        let settings = RenderSettings {
            threads: 4,
            tasks: 64,
            quiet: true,
            ..Default::default()
        };

        let summary = render(&pool, &source, &settings, |_, _| {}).unwrap();

        assert_eq!(summary.tasks_completed, 64);
        assert!(!summary.stopped_early);
        assert_eq!(film.sample_count(), 1024.0);
        assert_eq!(film.samples_per_pixel(), 4.0);
        assert_eq!(pool.allocated_buffer_count(), 0);

        let total_weight: Float = (0..16)
            .flat_map(|y| (0..16).map(move |x| (x, y)))
            .map(|(x, y)| film.pixel(0, 0, x, y).unwrap().weight_sum)
            .sum();
        assert_eq!(total_weight, 1024.0);
    }

    #[test]
    fn stops_when_film_has_enough_samples() {
        let (film, pool) = setup(1);
        let source = RowSource {
            width: 16,
            height: 16,
        };
        let settings = RenderSettings {
            threads: 2,
            tasks: 10_000,
            quiet: true,
            ..Default::default()
        };

        let summary = render(&pool, &source, &settings, |_, _| {}).unwrap();

        assert!(summary.stopped_early);
        assert!(summary.tasks_completed < 10_000);
        assert!(film.enough_samples());
    }

    #[test]
    fn periodic_writes_see_consistent_film() {
        let (film, pool) = setup(0);
        let source = RowSource {
            width: 16,
            height: 16,
        };
        let settings = RenderSettings {
            threads: 3,
            tasks: 256,
            quiet: true,
            write_interval: Some(Duration::from_millis(1)),
            ..Default::default()
        };

        let snapshots = AtomicUsize::new(0);
        let summary = render(&pool, &source, &settings, |_, lock| {
            let snapshot = film.snapshot(lock);
            assert_eq!(snapshot.groups.len(), 1);
            snapshots.fetch_add(1, Ordering::AcqRel);
        })
        .unwrap();

        assert!(summary.writes >= 1);
        assert_eq!(summary.writes, snapshots.load(Ordering::Acquire));
        assert_eq!(film.sample_count(), 256.0 * 16.0);
    }

    #[test]
    fn zero_threads_is_an_error() {
        let (_film, pool) = setup(0);
        let source = RowSource {
            width: 1,
            height: 1,
        };
        let settings = RenderSettings {
            threads: 0,
            ..Default::default()
        };
        assert!(render(&pool, &source, &settings, |_, _| {}).is_err());
    }
}
