//! Command line options

use clap::Parser;
use splat_core::contribution::PoolConfig;
use splat_core::film::FilmConfig;
use splat_core::geometry::Vector2f;
use splat_core::pbrt::Float;
use splat_core::renderer::RenderSettings;
use std::time::Duration;

/// Renders a synthetic scene through the contribution pool and reports statistics.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Number of threads to use for rendering.
    #[arg(
        long = "nthreads",
        short = 't',
        value_name = "NUM",
        default_value_t = 0,
        help = "Use specified number of threads for rendering; 0 uses all logical CPUs."
    )]
    n_threads: usize,

    /// Horizontal resolution.
    #[arg(long = "xresolution", value_name = "NUM", default_value_t = 256)]
    pub x_resolution: usize,

    /// Vertical resolution.
    #[arg(long = "yresolution", value_name = "NUM", default_value_t = 256)]
    pub y_resolution: usize,

    /// The crop window x0, x1, y0, y1.
    #[arg(
        long = "cropwindow",
        short = 'c',
        value_name = "FLOAT",
        num_args = 4,
        help = "Specify an image crop window (x0 x1 y0 y1)."
    )]
    pub crop_window: Vec<Float>,

    /// Requested number of film tiles.
    #[arg(
        long = "tiles",
        value_name = "NUM",
        default_value_t = 0,
        allow_negative_numbers = true,
        help = "Number of film tiles; 0 uses twice the thread count, -k uses k times the thread count."
    )]
    pub tiles: i32,

    /// Number of buffer groups.
    #[arg(long = "buffer-groups", value_name = "NUM", default_value_t = 1)]
    pub buffer_groups: usize,

    /// Number of buffers per group.
    #[arg(long = "buffers", value_name = "NUM", default_value_t = 1)]
    pub buffers_per_group: usize,

    /// Contribution buffer capacity.
    #[arg(long = "buffer-size", value_name = "NUM", default_value_t = 1024)]
    pub buffer_size: usize,

    /// Free buffers allocated up front.
    #[arg(long = "keepalive", value_name = "NUM", default_value_t = 1)]
    pub keepalive: usize,

    /// Buffer misses allowed per tile.
    #[arg(long = "miss-multiplier", value_name = "NUM", default_value_t = 32)]
    pub miss_multiplier: usize,

    /// Reconstruction filter.
    #[arg(long = "filter", value_name = "NAME", default_value = "mitchell")]
    pub filter: String,

    /// Reconstruction filter radius.
    #[arg(long = "filter-radius", value_name = "FLOAT")]
    pub filter_radius: Option<Float>,

    /// Samples per pixel to render.
    #[arg(long = "spp", value_name = "NUM", default_value_t = 16)]
    pub spp: u32,

    /// Samples per pixel after which rendering stops early.
    #[arg(long = "halt-spp", value_name = "NUM", default_value_t = 0)]
    pub halt_spp: u32,

    /// Seconds between film checkpoints.
    #[arg(long = "write-interval", value_name = "SECONDS")]
    pub write_interval: Option<f64>,

    /// Accumulate depth.
    #[arg(long = "zbuffer")]
    pub zbuffer: bool,

    /// Premultiply colors by alpha.
    #[arg(long = "premultiply-alpha")]
    pub premultiply_alpha: bool,

    /// Seed for the worker random number generators.
    #[arg(long = "seed", value_name = "NUM", default_value_t = 0)]
    pub seed: u64,

    /// Suppress all text output other than error messages.
    #[arg(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,
}

impl Options {
    /// Returns the number of threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        match self.n_threads {
            0 => max_threads,
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                n
            }
            n => n,
        }
    }

    /// Validates option combinations clap cannot check.
    pub fn validate(&self) -> Result<(), String> {
        if self.spp == 0 {
            return Err("Samples per pixel must be at least 1.".to_string());
        }
        if let Some(r) = self.filter_radius {
            if !(r > 0.0) {
                return Err(format!("Invalid filter radius {}.", r));
            }
        }
        self.write_interval()?;
        self.film_config().validate()?;
        self.pool_config().validate()
    }

    /// Returns the checkpoint interval.
    pub fn write_interval(&self) -> Result<Option<Duration>, String> {
        match self.write_interval {
            Some(s) if s > 0.0 => Duration::try_from_secs_f64(s)
                .map(Some)
                .map_err(|e| format!("Invalid write interval {}: {}.", s, e)),
            Some(s) => Err(format!("Invalid write interval {}.", s)),
            None => Ok(None),
        }
    }

    /// Returns the filter radius override.
    pub fn filter_radius(&self) -> Option<Vector2f> {
        self.filter_radius.map(|r| Vector2f::new(r, r))
    }

    /// Returns the film configuration.
    pub fn film_config(&self) -> FilmConfig {
        let crop_window = match self.crop_window.as_slice() {
            [x0, x1, y0, y1] => [*x0, *x1, *y0, *y1],
            _ => [0.0, 1.0, 0.0, 1.0],
        };
        FilmConfig {
            x_resolution: self.x_resolution,
            y_resolution: self.y_resolution,
            crop_window,
            tile_count: self.tiles,
            thread_count: self.threads(),
            buffer_groups: self.buffer_groups,
            buffers_per_group: self.buffers_per_group,
            halt_spp: self.halt_spp,
            premultiply_alpha: self.premultiply_alpha,
            use_zbuffer: self.zbuffer,
        }
    }

    /// Returns the contribution pool configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            buffer_size: self.buffer_size,
            keepalive: self.keepalive,
            miss_multiplier: self.miss_multiplier,
            ..Default::default()
        }
    }

    /// Returns the render loop settings.
    ///
    /// * `tasks` - Number of tasks.
    pub fn render_settings(&self, tasks: usize) -> Result<RenderSettings, String> {
        Ok(RenderSettings {
            threads: self.threads(),
            tasks,
            write_interval: self.write_interval()?,
            quiet: self.quiet,
            seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Options {
        let mut argv = vec!["splat-bench"];
        argv.extend_from_slice(args);
        Options::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let options = parse(&[]);
        assert!(options.validate().is_ok());
        assert!(options.threads() >= 1);
        assert_eq!(options.pool_config(), PoolConfig::default());
        assert_eq!(options.film_config().crop_window, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn negative_tile_count() {
        let options = parse(&["--tiles", "-3", "-t", "2"]);
        assert_eq!(options.tiles, -3);
        assert_eq!(options.film_config().requested_tile_count(), 6);
    }

    #[test]
    fn crop_window_takes_four_values() {
        let options = parse(&["--cropwindow", "0", "0.5", "0.25", "1"]);
        assert_eq!(options.film_config().crop_window, [0.0, 0.5, 0.25, 1.0]);
        assert!(Options::try_parse_from(["splat-bench", "--cropwindow", "0", "1"]).is_err());
    }

    #[test]
    fn invalid_values() {
        assert!(parse(&["--spp", "0"]).validate().is_err());
        assert!(parse(&["--buffer-size", "0"]).validate().is_err());
        assert!(parse(&["--filter-radius", "0"]).validate().is_err());
        assert!(parse(&["--write-interval", "0"]).validate().is_err());
        assert!(parse(&["--buffer-groups", "0"]).validate().is_err());
    }

    #[test]
    fn write_interval() {
        let options = parse(&["--write-interval", "0.5"]);
        assert_eq!(
            options.render_settings(10).unwrap().write_interval,
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn write_interval_out_of_range() {
        for s in ["1e30", "inf", "NaN"] {
            let options = parse(&["--write-interval", s]);
            assert!(options.validate().is_err(), "{s}");
            assert!(options.render_settings(10).is_err(), "{s}");
        }
    }
}
