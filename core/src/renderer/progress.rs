//! Progress reporting

use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar template.
const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Returns a progress bar for a number of work items. The bar draws nothing when `quiet` is set.
///
/// * `total` - Number of work items.
/// * `quiet` - Suppress output.
pub fn create_progress_reporter(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");

    let progress = ProgressBar::new(total);
    progress.set_style(style);
    progress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_is_valid() {
        assert!(ProgressStyle::with_template(PROGRESS_TEMPLATE).is_ok());
    }

    #[test]
    fn quiet_reporter_counts() {
        let progress = create_progress_reporter(10, true);
        progress.inc(3);
        assert_eq!(progress.position(), 3);
        assert!(progress.is_hidden());
    }
}
