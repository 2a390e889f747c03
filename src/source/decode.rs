//! Decoder for single lines of probe output.
//!
//! The probe prints one line per conversion attempt:
//!
//! ```text
//! 2846b25204000054 21.500000
//! 2846b25204000054 read failed (reason=0x04)
//! ```

use crate::error::DecodeError;

const FAILURE_PREFIX: &str = "read failed (reason=0x";
const FAILURE_SUFFIX: &str = ")";

/// Outcome of decoding one probe line.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A finite numeric reading.
    Reading { sensor_id: String, value: f64 },
    /// The probe reported a failed conversion with a reason code.
    Failure { sensor_id: String, reason: u32 },
    /// A payload that is neither a number nor a recognized failure.
    Unrecognized { sensor_id: String, text: String },
}

impl Decoded {
    pub fn sensor_id(&self) -> &str {
        match self {
            Decoded::Reading { sensor_id, .. }
            | Decoded::Failure { sensor_id, .. }
            | Decoded::Unrecognized { sensor_id, .. } => sensor_id,
        }
    }
}

/// Decode one line of probe output.
///
/// Surrounding whitespace (including the line terminator) is ignored.
pub fn decode_line(line: &str) -> Result<Decoded, DecodeError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(DecodeError::Empty);
    }

    let (sensor_id, payload) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| DecodeError::MissingSeparator(line.to_string()))?;
    let sensor_id = sensor_id.to_string();
    let payload = payload.trim();

    if let Ok(value) = payload.parse::<f64>() {
        if value.is_finite() {
            return Ok(Decoded::Reading { sensor_id, value });
        }
    }

    if let Some(reason) = parse_failure(payload) {
        return Ok(Decoded::Failure { sensor_id, reason });
    }

    Ok(Decoded::Unrecognized {
        sensor_id,
        text: payload.to_string(),
    })
}

/// Parse `read failed (reason=0x<hex>)` into its reason code.
fn parse_failure(payload: &str) -> Option<u32> {
    let hex = payload
        .strip_prefix(FAILURE_PREFIX)?
        .strip_suffix(FAILURE_SUFFIX)?;
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
