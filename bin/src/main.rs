#[macro_use]
extern crate log;

mod options;
mod scene;

use clap::Parser;
use options::Options;
use scene::GradientSource;
use splat_core::contribution::ContributionPool;
use splat_core::film::{FilmSnapshot, TiledFilm};
use splat_core::pbrt::Float;
use splat_core::print_stats;
use splat_core::renderer::render;
use std::sync::Arc;

#[cfg(all(feature = "dhat-rs", feature = "jemalloc"))]
compile_error!("feature 'dhat-rs' and feature 'jemalloc' cannot be enabled at the same time");

#[cfg(feature = "dhat-rs")]
use dhat::{Dhat, DhatAlloc};

#[cfg(feature = "dhat-rs")]
#[global_allocator]
static ALLOCATOR: DhatAlloc = DhatAlloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static ALLOCATOR: Jemalloc = Jemalloc;

fn main() {
    #[cfg(feature = "dhat-rs")]
    let _dhat = Dhat::start_heap_profiling();

    // Initialize `env_logger`.
    env_logger::init();

    let options = Options::parse();
    if let Err(e) = run(&options) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(options: &Options) -> Result<(), String> {
    options.validate()?;

    let filter = filters::make_filter(&options.filter, options.filter_radius())?;
    let film_config = options.film_config();
    let film = Arc::new(TiledFilm::new(film_config.clone(), filter)?);
    let pool = Arc::new(ContributionPool::new(film.clone(), options.pool_config())?);
    info!(
        "Film has {} tiles of height {}",
        film.tiling().tile_count(),
        film.tiling().tile_height()
    );

    let source = GradientSource::new(&film_config);
    let settings = options.render_settings(source.task_count(options.spp))?;

    let summary = render(&pool, &source, &settings, |_, lock| {
        let snapshot = film.snapshot(lock);
        info!(
            "Checkpoint at {} samples, mean luminance {:.4}",
            snapshot.sample_count,
            mean_luminance(&snapshot)
        );
    })?;

    if !options.quiet {
        println!(
            "Rendered {} tasks in {:.2?}{}",
            summary.tasks_completed,
            summary.elapsed,
            if summary.stopped_early { " (halted early)" } else { "" }
        );
        println!(
            "{} contributions accumulated, {} rejected, {:.2} samples per pixel",
            film.contributions_received(),
            film.contributions_rejected(),
            film.samples_per_pixel()
        );
        print_stats!();
    }

    Ok(())
}

/// Returns the mean filtered luminance over every pixel of every buffer group.
///
/// * `snapshot` - Film snapshot.
fn mean_luminance(snapshot: &FilmSnapshot) -> Float {
    let count = snapshot.groups.iter().map(|g| g.len()).sum::<usize>();
    if count == 0 {
        return 0.0;
    }
    let total: Float = snapshot
        .groups
        .iter()
        .flat_map(|g| g.iter())
        .map(|p| p.weighted_xyz().y())
        .sum();
    total / count as Float
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use splat_core::film::Pixel;
    use splat_core::spectrum::XYZColor;

    #[test]
    fn mean_luminance_of_empty_snapshot() {
        let snapshot = FilmSnapshot {
            x_start: 0,
            y_start: 0,
            width: 0,
            height: 0,
            groups: vec![],
            sample_count: 0.0,
        };
        assert_eq!(mean_luminance(&snapshot), 0.0);
    }

    #[test]
    fn mean_luminance_averages_pixels() {
        let mut lit = Pixel::default();
        lit.add(&XYZColor::new(0.0, 2.0, 0.0), 1.0, 1.0);
        let snapshot = FilmSnapshot {
            x_start: 0,
            y_start: 0,
            width: 2,
            height: 1,
            groups: vec![vec![lit, Pixel::default()]],
            sample_count: 1.0,
        };
        assert!(approx_eq!(Float, mean_luminance(&snapshot), 1.0, epsilon = 1e-6));
    }

    #[test]
    fn renders_small_image() {
        let options = Options::try_parse_from([
            "splat-bench",
            "--xresolution",
            "8",
            "--yresolution",
            "8",
            "--spp",
            "2",
            "-t",
            "2",
            "--quiet",
        ])
        .unwrap();
        assert!(run(&options).is_ok());
    }
}
