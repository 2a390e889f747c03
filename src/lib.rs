//! # tempd
//!
//! A small telemetry aggregator for 1-wire temperature probes.
//!
//! tempd runs an external measurement process, reads the readings it prints
//! line by line, filters and aggregates them per sensor, and answers every
//! TCP connection with a report in the multigraph line protocol understood
//! by pull-based collectors such as munin. Each report resets the
//! per-sensor windows, so consecutive reports cover disjoint intervals.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   lines   ┌────────────┐  Verdict  ┌─────────────┐
//! │ probe stdout │──────────▶│   source   │──────────▶│    data     │
//! │  (process)   │           │  (ingest)  │           │(SensorTable)│
//! └──────────────┘           └────────────┘           └──────┬──────┘
//!                                                            │ take_report()
//!                             ┌────────────┐   text   ┌──────▼──────┐
//!        collector ◀──────────│   report   │◀─────────│   report    │
//!        (TCP peer)           │  (server)  │          │  (render)   │
//!                             └────────────┘          └─────────────┘
//! ```
//!
//! - **[`source`]**: decoding of probe lines, process spawning, and the
//!   ingestion loop
//! - **[`data`]**: sensor name resolution, filtering policy, per-sensor
//!   windows, statistics, and flow estimation
//! - **[`report`]**: the [`Report`] projection, its text form, and the TCP server
//! - **[`service`]**: startup and the running/terminated lifecycle
//! - **[`config`]**: layered [`Settings`]
//!
//! ## Usage
//!
//! ### As a daemon
//!
//! ```bash
//! tempd --config /etc/tempd.toml
//! tempd --port 31338 -- /usr/local/bin/onewire-probe /dev/ttyUSB0
//! ```
//!
//! ### As a library
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use tempd::{FilterPolicy, FlowEstimator, IngestLoop, MedianFilter, Renderer, SensorResolver, SensorTable};
//!
//! let table = SensorTable::new(2);
//! let names = HashMap::from([("2846b25204000054".to_string(), "wohnzimmer".to_string())]);
//! let ingest = IngestLoop::new(
//!     table.clone(),
//!     Arc::new(SensorResolver::from_config(&names, None)),
//!     FilterPolicy::default(),
//! );
//!
//! ingest.ingest_line("2846b25204000054 21.500000");
//!
//! let renderer = Renderer::new(table, MedianFilter::pass_through(), FlowEstimator::default());
//! let text = renderer.render();
//! assert!(text.contains("wohnzimmer.value 21.5\n"));
//! ```
//!
//! ### Feeding an async stream
//!
//! ```
//! use std::io::Cursor;
//! use std::sync::Arc;
//! use tempd::{FilterPolicy, IngestLoop, SensorResolver, SensorTable};
//!
//! # tokio_test::block_on(async {
//! let table = SensorTable::new(2);
//! let ingest = IngestLoop::new(
//!     table.clone(),
//!     Arc::new(SensorResolver::from_config(&Default::default(), Some("unknown"))),
//!     FilterPolicy::default(),
//! );
//!
//! let summary = ingest.run(Cursor::new("28ff 20.0\n28ff 85.0\n")).await.unwrap();
//! assert_eq!(summary.accepted, 1);
//! assert_eq!(summary.filtered, 1);
//! # });
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod service;
pub mod source;

// Re-export main types for convenience
pub use config::Settings;
pub use data::{
    FilterPolicy, FlowEstimator, MedianFilter, SensorResolver, SensorTable, SensorWindow, Verdict,
};
pub use error::{DecodeError, ReportError, ServiceError};
pub use report::{Renderer, Report, ReportServer, SensorReport};
pub use service::{Phase, RunningService, Service, Termination};
pub use source::{decode_line, Decoded, IngestLoop, IngestSummary, MeasurementProcess};
