//! Per-sensor aggregation state.

use super::flow::FlowEstimator;
use super::history::OutputHistory;
use super::policy::Verdict;
use super::stats::{mean, median, MedianFilter};

/// Rolling window, counters, and output history of one sensor.
///
/// The window and counters cover the readings since the last report and are
/// cleared by [`SensorWindow::reset`]. The output history is kept across
/// resets.
#[derive(Debug, Clone)]
pub struct SensorWindow {
    raw: Vec<f64>,
    accepted: u64,
    filtered: u64,
    history: OutputHistory,
}

impl SensorWindow {
    pub fn new(history_size: usize) -> Self {
        Self {
            raw: Vec::new(),
            accepted: 0,
            filtered: 0,
            history: OutputHistory::new(history_size),
        }
    }

    /// Fold one classified observation into the window.
    pub fn apply(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Accept(value) => self.accept(value),
            Verdict::Filter => self.filter(),
            Verdict::Ignore => {}
        }
    }

    /// Keep an in-range reading for this window's output.
    pub fn accept(&mut self, value: f64) {
        self.raw.push(value);
        self.accepted += 1;
        debug_assert_eq!(self.accepted, self.raw.len() as u64);
    }

    /// Count a filtered observation; it contributes no value.
    pub fn filter(&mut self) {
        self.filtered += 1;
    }

    /// Accepted readings in arrival order.
    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    pub fn accepted_count(&self) -> u64 {
        self.accepted
    }

    pub fn filtered_count(&self) -> u64 {
        self.filtered
    }

    pub fn history(&self) -> &OutputHistory {
        &self.history
    }

    /// Percentage of observations filtered in this window, `NaN` if none.
    pub fn ratio(&self) -> f64 {
        let total = self.filtered + self.accepted;
        if total == 0 {
            return f64::NAN;
        }
        100.0 * self.filtered as f64 / total as f64
    }

    /// Mean of the window after the median filter stage.
    ///
    /// Records the result in the output history. Returns `None` and leaves
    /// the history alone when the window is empty or the filter removed
    /// every value.
    pub fn output(&mut self, filter: &MedianFilter) -> Option<f64> {
        let central = median(&self.raw)?;
        let kept = filter.apply(&self.raw, central);
        let value = mean(&kept)?;
        self.history.push(value);
        Some(value)
    }

    pub fn flow(&self, estimator: &FlowEstimator) -> f64 {
        estimator.estimate(&self.history)
    }

    /// Start a new window. The output history is kept.
    pub fn reset(&mut self) {
        self.raw.clear();
        self.accepted = 0;
        self.filtered = 0;
    }
}
