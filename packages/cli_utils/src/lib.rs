#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal helpers for the venue profile CLI.
//!
//! [`IndicatifProgress`] renders menu retrieval progress, and
//! [`init_logger`] routes `log` output through the same
//! [`MultiProgress`] so log lines are printed above the bar instead of
//! through it.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use venue_profile_venues::progress::ProgressCallback;

pub use indicatif::MultiProgress;

/// Log level used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info";

const SPINNER_TEMPLATE: &str = "{spinner:.yellow} {msg}";
const VENUES_TEMPLATE: &str = "  {msg:30!} {wide_bar:.yellow/dim} {pos}/{len} venues [{eta}]";

/// Menu retrieval progress on an `indicatif` bar.
///
/// Spins until [`ProgressCallback::set_total`] reports how many venues
/// will be visited, then shows a bar.
pub struct IndicatifProgress {
    bar: ProgressBar,
    counted: ProgressStyle,
}

impl IndicatifProgress {
    /// Adds a venue progress bar to `multi`.
    #[must_use]
    pub fn venues_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let spinner = ProgressStyle::with_template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let counted = ProgressStyle::with_template(VENUES_TEMPLATE)
            .map_or_else(|_| ProgressStyle::default_bar(), |style| style.progress_chars("=> "));

        let bar = multi.add(ProgressBar::new_spinner().with_style(spinner));
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));

        Arc::new(Self { bar, counted })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.counted.clone());
        self.bar.set_length(total);
        self.bar.reset();
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.disable_steady_tick();
        self.bar.finish_with_message(msg);
    }
}

/// Installs `pretty_env_logger` behind `indicatif-log-bridge`.
///
/// Filters come from `RUST_LOG`, defaulting to `info`. Every progress bar
/// must be added to the returned [`MultiProgress`].
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let logger = pretty_env_logger::formatted_builder()
        .parse_filters(&filter)
        .build();
    let max_level = logger.filter();

    if let Err(e) = indicatif_log_bridge::LogWrapper::new(multi.clone(), logger).try_init() {
        eprintln!("Logger already initialized: {e}");
    }
    log::set_max_level(max_level);

    multi
}
