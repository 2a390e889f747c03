//! Input side: the measurement process and the lines it prints.
//!
//! - [`decode`]: turns one probe line into a [`Decoded`] outcome
//! - [`process`]: spawns the probe and hands out its stdout
//! - [`ingest`]: the loop folding decoded lines into the sensor table

pub mod decode;
pub mod ingest;
pub mod process;

pub use decode::{decode_line, Decoded};
pub use ingest::{IngestLoop, IngestSummary, LineOutcome};
pub use process::MeasurementProcess;
