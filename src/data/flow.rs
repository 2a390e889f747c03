//! Flow (rate of change) estimation over the output history.

use super::history::OutputHistory;
use crate::config::FlowConfig;

/// Derives a per-minute rate of change from a sensor's output history.
///
/// The first differences of the history are left-padded with zeros to
/// `history_size - 1` entries and averaged with linearly increasing weights,
/// so the newest difference counts most. The weighted mean is scaled back up
/// by the number of differences and then to a per-minute rate using the
/// assumed report interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowEstimator {
    history_size: usize,
    report_interval_secs: f64,
}

impl FlowEstimator {
    pub fn new(history_size: usize, report_interval_secs: f64) -> Self {
        Self {
            history_size,
            report_interval_secs,
        }
    }

    pub fn from_config(config: &FlowConfig) -> Self {
        Self::new(config.history_size, config.report_interval_secs)
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }

    /// Multiplier converting a per-report change into a per-minute change.
    pub fn per_minute_scale(&self) -> f64 {
        60.0 / self.report_interval_secs
    }

    /// Estimated flow, or `NaN` with fewer than two history points.
    pub fn estimate(&self, history: &OutputHistory) -> f64 {
        let deltas = history.deltas();
        let slots = self.history_size.saturating_sub(1);
        if deltas.is_empty() || slots == 0 {
            return f64::NAN;
        }

        // newest `slots` deltas, zero-padded at the front
        let skip = deltas.len().saturating_sub(slots);
        let mut padded = vec![0.0; slots.saturating_sub(deltas.len())];
        padded.extend_from_slice(&deltas[skip..]);

        let weight_sum = (slots * (slots + 1)) as f64 / 2.0;
        let weighted: f64 = padded
            .iter()
            .enumerate()
            .map(|(i, d)| (i + 1) as f64 / weight_sum * d)
            .sum();

        weighted * slots as f64 * self.per_minute_scale()
    }
}

impl Default for FlowEstimator {
    fn default() -> Self {
        Self::from_config(&FlowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(capacity: usize, values: &[f64]) -> OutputHistory {
        let mut history = OutputHistory::new(capacity);
        for &v in values {
            history.push(v);
        }
        history
    }

    #[test]
    fn steady_output_has_zero_flow() {
        let flow = FlowEstimator::default().estimate(&history(2, &[20.0, 20.0]));
        assert_eq!(flow, 0.0);
    }

    #[test]
    fn fewer_than_two_points_is_nan() {
        let estimator = FlowEstimator::default();
        assert!(estimator.estimate(&history(2, &[])).is_nan());
        assert!(estimator.estimate(&history(2, &[20.0])).is_nan());
    }

    #[test]
    fn default_scales_single_delta_to_per_minute() {
        // one delta of 0.5 per 5 s report interval -> 6.0 per minute
        let flow = FlowEstimator::default().estimate(&history(2, &[20.0, 20.5]));
        assert!((flow - 6.0).abs() < 1e-9);
    }

    #[test]
    fn falling_output_has_negative_flow() {
        let flow = FlowEstimator::default().estimate(&history(2, &[21.0, 20.0]));
        assert!((flow + 12.0).abs() < 1e-9);
    }

    #[test]
    fn wider_window_weights_newest_delta_most() {
        // deltas [1.0, 2.0], weights [1/3, 2/3] -> 5/3, times 2 deltas, times 60/60
        let estimator = FlowEstimator::new(3, 60.0);
        let flow = estimator.estimate(&history(3, &[0.0, 1.0, 3.0]));
        assert!((flow - 10.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn startup_deltas_are_zero_padded() {
        // only one real delta of 3.0 in a 4-slot history: padded [0, 0, 3]
        // weights [1/6, 2/6, 3/6] -> 1.5, times 3 deltas -> 4.5
        let estimator = FlowEstimator::new(4, 60.0);
        let flow = estimator.estimate(&history(4, &[10.0, 13.0]));
        assert!((flow - 4.5).abs() < 1e-9);
    }

    #[test]
    fn history_larger_than_window_uses_newest_deltas() {
        let estimator = FlowEstimator::new(2, 60.0);
        let flow = estimator.estimate(&history(4, &[0.0, 100.0, 100.0, 101.0]));
        assert!((flow - 1.0).abs() < 1e-9);
    }

    #[test]
    fn per_minute_scale_follows_interval() {
        assert_eq!(FlowEstimator::new(2, 5.0).per_minute_scale(), 12.0);
        assert_eq!(FlowEstimator::new(2, 30.0).per_minute_scale(), 2.0);
    }
}
