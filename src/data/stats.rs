//! Window statistics.

/// Median of `values`, or `None` if empty.
///
/// For an even count this is the mean of the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Arithmetic mean of `values`, or `None` if empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Close-to-median filter applied to a window before averaging.
///
/// With no deviation configured every value passes through.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MedianFilter {
    max_deviation: Option<f64>,
}

impl MedianFilter {
    pub fn new(max_deviation: Option<f64>) -> Self {
        Self { max_deviation }
    }

    pub fn pass_through() -> Self {
        Self::default()
    }

    /// Values within the allowed distance of `median`.
    pub fn apply(&self, values: &[f64], median: f64) -> Vec<f64> {
        match self.max_deviation {
            None => values.to_vec(),
            Some(max) => values
                .iter()
                .copied()
                .filter(|v| (v - median).abs() <= max)
                .collect(),
        }
    }
}
