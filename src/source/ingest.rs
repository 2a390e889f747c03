//! Ingestion loop feeding probe output into the sensor table.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

use super::decode::{decode_line, Decoded};
use crate::data::{FilterPolicy, SensorResolver, SensorTable, Verdict};
use crate::error::{DecodeError, ServiceError};

/// Totals of what the loop did with the lines it read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub lines: u64,
    pub accepted: u64,
    pub filtered: u64,
    /// Decode failures with a reason code that is not counted.
    pub ignored: u64,
    pub unrecognized: u64,
    pub malformed: u64,
}

/// What happened to one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineOutcome {
    Accepted,
    Filtered,
    Ignored,
    Unrecognized,
    Malformed,
    Blank,
}

impl IngestSummary {
    fn count(&mut self, outcome: LineOutcome) {
        self.lines += 1;
        match outcome {
            LineOutcome::Accepted => self.accepted += 1,
            LineOutcome::Filtered => self.filtered += 1,
            LineOutcome::Ignored => self.ignored += 1,
            LineOutcome::Unrecognized => self.unrecognized += 1,
            LineOutcome::Malformed => self.malformed += 1,
            LineOutcome::Blank => {}
        }
    }
}

/// Reads probe lines and folds them into the sensor table.
#[derive(Debug, Clone)]
pub struct IngestLoop {
    table: SensorTable,
    resolver: Arc<SensorResolver>,
    policy: FilterPolicy,
}

impl IngestLoop {
    /// Loop recording into `table` under `policy`.
    pub fn new(table: SensorTable, resolver: Arc<SensorResolver>, policy: FilterPolicy) -> Self {
        Self {
            table,
            resolver,
            policy,
        }
    }

    /// Decode, resolve, and record one line.
    pub fn ingest_line(&self, line: &str) -> LineOutcome {
        let decoded = match decode_line(line) {
            Ok(decoded) => decoded,
            Err(DecodeError::Empty) => return LineOutcome::Blank,
            Err(e) => {
                warn!(error = %e, "discarding malformed line");
                return LineOutcome::Malformed;
            }
        };

        let name = self.resolver.resolve(decoded.sensor_id());
        let (verdict, outcome) = match &decoded {
            Decoded::Reading { value, .. } => match self.policy.classify_reading(*value) {
                Verdict::Accept(v) => {
                    debug!(sensor = name, value = v, "accepted reading");
                    (Verdict::Accept(v), LineOutcome::Accepted)
                }
                verdict => {
                    warn!(sensor = name, value, "skipping implausible reading");
                    (verdict, LineOutcome::Filtered)
                }
            },
            Decoded::Failure { reason, .. } => match self.policy.classify_failure(*reason) {
                Verdict::Ignore => {
                    debug!(sensor = name, reason = format_args!("{reason:#04x}"), "read failed");
                    (Verdict::Ignore, LineOutcome::Ignored)
                }
                verdict => {
                    warn!(
                        sensor = name,
                        reason = format_args!("{reason:#04x}"),
                        "read failed, counting as filtered"
                    );
                    (verdict, LineOutcome::Filtered)
                }
            },
            Decoded::Unrecognized { text, .. } => {
                debug!(sensor = name, payload = %text, "discarding unrecognized payload");
                return LineOutcome::Unrecognized;
            }
        };

        self.table.record(name, verdict);
        outcome
    }

    /// Ingest lines until the stream closes and return the totals.
    ///
    /// Only a read error ends the loop early. Invalid UTF-8 is replaced
    /// rather than treated as an error.
    pub async fn run<R>(&self, reader: R) -> Result<IngestSummary, ServiceError>
    where
        R: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        let mut summary = IngestSummary::default();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => return Ok(summary),
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    summary.count(self.ingest_line(&line));
                }
                Err(e) => return Err(ServiceError::Read(e)),
            }
        }
    }
}
