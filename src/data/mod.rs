//! Aggregation state and the statistics computed over it.
//!
//! ## Submodules
//!
//! - [`resolver`]: Sensor id to display name mapping ([`SensorResolver`])
//! - [`policy`]: Range and reason-code classification of observations ([`FilterPolicy`])
//! - [`window`]: Per-sensor window, counters, and output ([`SensorWindow`])
//! - [`table`]: The shared, lock-guarded map of all windows ([`SensorTable`])
//! - [`stats`]: Median, mean, and the close-to-median filter stage
//! - [`history`]: Bounded output history kept across reports
//! - [`flow`]: Rate-of-change estimation over the output history ([`FlowEstimator`])
//!
//! ## Data Flow
//!
//! ```text
//! Decoded line
//!        │
//!        ▼
//! SensorResolver::resolve() ──▶ name
//!        │
//!        ▼
//! FilterPolicy::classify_*() ──▶ Verdict
//!        │
//!        ▼
//! SensorTable::record(name, verdict)
//!        │
//!        ▼  (on report)
//! SensorWindow::output() ──▶ OutputHistory ──▶ FlowEstimator::estimate()
//! ```

pub mod flow;
pub mod history;
pub mod policy;
pub mod resolver;
pub mod stats;
pub mod table;
pub mod window;

pub use flow::FlowEstimator;
pub use history::OutputHistory;
pub use policy::{FilterPolicy, Verdict};
pub use resolver::{Fallback, SensorResolver};
pub use stats::MedianFilter;
pub use table::SensorTable;
pub use window::SensorWindow;
