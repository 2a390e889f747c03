//! Report rendering in the multigraph line protocol.
//!
//! ```text
//! multigraph sensors_wohnzimmer
//! wohnzimmer.value 21.5
//! multigraph sensors_wohnzimmer_flow
//! wohnzimmer-flow.value 0.0
//! multigraph sensors_wohnzimmer_stats
//! wohnzimmer-ratio.value 0.0
//! multigraph sensors
//! wohnzimmer.value 21.5
//! multigraph sensors_flow
//! wohnzimmer-flow.value 0.0
//! ```

use crate::config::Settings;
use crate::data::{FlowEstimator, MedianFilter, SensorTable};

/// One sensor's line in a report.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReport {
    pub name: String,
    /// Mean of the window, `NaN` if the window was empty.
    pub output: f64,
    /// Per-minute rate of change, `NaN` without enough history.
    pub flow: f64,
    /// Percentage of filtered observations, `NaN` without observations.
    pub ratio: f64,
    pub accepted: u64,
    pub filtered: u64,
}

/// Projection of every known sensor at the moment of one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub sensors: Vec<SensorReport>,
}

impl Report {
    /// Look up one sensor's line by name.
    pub fn get(&self, name: &str) -> Option<&SensorReport> {
        self.sensors.iter().find(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Serialize as multigraph text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        for s in &self.sensors {
            out.push_str(&format!("multigraph sensors_{}\n", s.name));
            out.push_str(&format!("{}.value {}\n", s.name, format_value(s.output)));
            out.push_str(&format!("multigraph sensors_{}_flow\n", s.name));
            out.push_str(&format!("{}-flow.value {}\n", s.name, format_value(s.flow)));
            out.push_str(&format!("multigraph sensors_{}_stats\n", s.name));
            out.push_str(&format!("{}-ratio.value {}\n", s.name, format_value(s.ratio)));
        }

        out.push_str("multigraph sensors\n");
        for s in &self.sensors {
            out.push_str(&format!("{}.value {}\n", s.name, format_value(s.output)));
        }

        out.push_str("multigraph sensors_flow\n");
        for s in &self.sensors {
            out.push_str(&format!("{}-flow.value {}\n", s.name, format_value(s.flow)));
        }

        out
    }
}

/// Format a value for the wire: `NaN`, or the shortest round-trip decimal
/// with a fractional part always present (`15.0`, `33.333333333333336`).
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    format!("{:?}", value)
}

/// Builds reports from the sensor table and resets its windows.
#[derive(Debug, Clone)]
pub struct Renderer {
    table: SensorTable,
    filter: MedianFilter,
    flow: FlowEstimator,
}

impl Renderer {
    /// The table's history size and the estimator's window must agree.
    pub fn new(table: SensorTable, filter: MedianFilter, flow: FlowEstimator) -> Self {
        debug_assert_eq!(
            table.history_size(),
            flow.history_size(),
            "output history and flow window differ in size"
        );
        Self {
            table,
            filter,
            flow,
        }
    }

    pub fn from_settings(table: SensorTable, settings: &Settings) -> Self {
        Self::new(
            table,
            MedianFilter::new(settings.filter.median_deviation),
            FlowEstimator::from_config(&settings.flow),
        )
    }

    /// Take a report of every window and start new windows.
    ///
    /// The whole table is locked for the duration, so readings arriving
    /// meanwhile land in the next window.
    pub fn take_report(&self) -> Report {
        self.table.with_windows(|windows| {
            let sensors = windows
                .iter_mut()
                .map(|(name, window)| {
                    let ratio = window.ratio();
                    let accepted = window.accepted_count();
                    let filtered = window.filtered_count();
                    let (output, flow) = match window.output(&self.filter) {
                        Some(output) => (output, window.flow(&self.flow)),
                        None => (f64::NAN, f64::NAN),
                    };
                    window.reset();

                    SensorReport {
                        name: name.clone(),
                        output,
                        flow,
                        ratio,
                        accepted,
                        filtered,
                    }
                })
                .collect();

            Report { sensors }
        })
    }

    /// Take a report and serialize it.
    pub fn render(&self) -> String {
        self.take_report().to_text()
    }
}
