//! Merge progress for the hierarchical solver.
//!
//! The solver announces how many merges it plans, reports each merge with
//! the cluster count left, and signals when it stops. The CLI draws this
//! with `indicatif`; library callers pass [`NoopReporter`].

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{spinner:.green} Merging [{bar:30.cyan/blue}] {pos}/{len} ({msg})";

/// Receives merge events from a hierarchical run. Every hook defaults to doing nothing.
pub trait ProgressReporter: Send + Sync {
    fn merges_planned(&self, _total: u64) {}

    fn merged(&self, _clusters_left: usize) {}

    fn done(&self) {}
}

#[derive(Debug, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {}

/// Progress bar on stderr, one tick per merge.
#[derive(Debug)]
pub struct IndicatifReporter {
    bar: ProgressBar,
}

impl IndicatifReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }
        Self { bar }
    }

    /// Counts merges without drawing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Merges reported since the last [`merges_planned`](ProgressReporter::merges_planned).
    pub fn completed(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for IndicatifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for IndicatifReporter {
    fn merges_planned(&self, total: u64) {
        self.bar.reset();
        self.bar.set_length(total);
    }

    fn merged(&self, clusters_left: usize) {
        self.bar.set_message(format!("{clusters_left} clusters"));
        self.bar.inc(1);
    }

    fn done(&self) {
        self.bar.finish_and_clear();
    }
}
