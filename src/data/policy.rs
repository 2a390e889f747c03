//! Acceptance policy for readings and decode failures.

use crate::config::FilterConfig;

/// What to do with one observation for a sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Append the value to the window.
    Accept(f64),
    /// Count the observation as filtered.
    Filter,
    /// Leave the counters untouched.
    Ignore,
}

/// Plausibility bounds and reason-code classification.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    upper_bound: f64,
    lower_bound: Option<f64>,
    counted_reasons: Vec<u32>,
}

impl FilterPolicy {
    /// Policy with the given bounds and failure reasons that count as filtered.
    pub fn new(upper_bound: f64, lower_bound: Option<f64>, counted_reasons: Vec<u32>) -> Self {
        Self {
            upper_bound,
            lower_bound,
            counted_reasons,
        }
    }

    /// Policy from the `[filter]` config section.
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(
            config.upper_bound,
            config.lower_bound,
            config.counted_reason_codes.clone(),
        )
    }

    /// Both bounds are inclusive: only values strictly outside are filtered.
    pub fn classify_reading(&self, value: f64) -> Verdict {
        if value > self.upper_bound {
            return Verdict::Filter;
        }
        if self.lower_bound.is_some_and(|lower| value < lower) {
            return Verdict::Filter;
        }
        Verdict::Accept(value)
    }

    /// Listed reasons count as filtered, every other failure is ignored.
    pub fn classify_failure(&self, reason: u32) -> Verdict {
        if self.counted_reasons.contains(&reason) {
            Verdict::Filter
        } else {
            Verdict::Ignore
        }
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_bound_is_exclusive_above() {
        let policy = FilterPolicy::new(84.0, None, vec![4]);

        assert_eq!(policy.classify_reading(83.9375), Verdict::Accept(83.9375));
        assert_eq!(policy.classify_reading(84.0), Verdict::Accept(84.0));
        assert_eq!(policy.classify_reading(84.0625), Verdict::Filter);
        assert_eq!(policy.classify_reading(85.0), Verdict::Filter);
    }

    #[test]
    fn lower_bound_is_optional() {
        let unbounded = FilterPolicy::new(84.0, None, vec![]);
        assert_eq!(unbounded.classify_reading(-12.5), Verdict::Accept(-12.5));

        let bounded = FilterPolicy::new(84.0, Some(0.0), vec![]);
        assert_eq!(bounded.classify_reading(0.0), Verdict::Accept(0.0));
        assert_eq!(bounded.classify_reading(-0.0625), Verdict::Filter);
    }

    #[test]
    fn only_counted_reason_codes_are_filtered() {
        let policy = FilterPolicy::default();

        assert_eq!(policy.classify_failure(0x04), Verdict::Filter);
        assert_eq!(policy.classify_failure(0x01), Verdict::Ignore);
        assert_eq!(policy.classify_failure(0x02), Verdict::Ignore);
        assert_eq!(policy.classify_failure(0x44), Verdict::Ignore);
    }
}
