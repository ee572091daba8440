//! Probe Sample Parsing
//!
//! A DS18B20-style sample as exposed by the kernel 1-Wire driver looks like:
//!
//! ```text
//! 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
//! 72 01 4b 46 7f ff 0e 10 57 t=23125
//! ```
//!
//! The trailing newline makes the raw text split into exactly three parts.

use crate::error::ProbeError;
use crate::source::ProbeSource;
use crate::{CRC_OK_MARKER, MIN_PROBE_ID_LEN, PROBE_ID_SEGMENT, TEMPERATURE_DIGITS};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// A single temperature sample from one probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Probe id taken from the sample path (e.g. "28-0316a2797bff")
    pub probe_id: String,
    /// Temperature in degrees Celsius
    pub temperature_c: f64,
}

/// Parse a raw sample, reporting why it was rejected
pub fn try_parse_sample(path: &str, content: &str) -> Result<Reading, ProbeError> {
    try_parse_sample_at(path, content, PROBE_ID_SEGMENT)
}

/// Parse a raw sample whose probe id sits at slash-segment `id_segment` of `path`
pub fn try_parse_sample_at(
    path: &str,
    content: &str,
    id_segment: usize,
) -> Result<Reading, ProbeError> {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.len() != 3 {
        return Err(ProbeError::Format(format!("expected 3 lines, got {}", lines.len())));
    }
    if !lines[0].ends_with(CRC_OK_MARKER) {
        return Err(ProbeError::Format("CRC marker missing".to_string()));
    }

    let probe_id = path
        .split('/')
        .nth(id_segment)
        .filter(|id| id.len() >= MIN_PROBE_ID_LEN)
        .ok_or_else(|| ProbeError::MissingId(path.to_string()))?;

    let data = lines[1];
    let field = data
        .len()
        .checked_sub(TEMPERATURE_DIGITS)
        .and_then(|start| data.get(start..))
        .ok_or_else(|| ProbeError::Temperature(data.to_string()))?;
    let milli_c: i32 = field
        .parse()
        .map_err(|_| ProbeError::Temperature(field.to_string()))?;

    Ok(Reading {
        probe_id: probe_id.to_string(),
        temperature_c: f64::from(milli_c) / 1000.0,
    })
}

/// Parse a raw sample, discarding it silently on any failure
pub fn parse_sample(path: &str, content: &str) -> Option<Reading> {
    parse_sample_at(path, content, PROBE_ID_SEGMENT)
}

fn parse_sample_at(path: &str, content: &str, id_segment: usize) -> Option<Reading> {
    match try_parse_sample_at(path, content, id_segment) {
        Ok(reading) => Some(reading),
        Err(e) => {
            trace!("Discarding sample from {}: {}", path, e);
            None
        }
    }
}

/// Read and parse one probe. Blocks for as long as the source does.
pub fn read_probe<S: ProbeSource + ?Sized>(source: &S, path: &str) -> Option<Reading> {
    match source.read_raw(path) {
        Ok(content) => parse_sample_at(path, &content, source.id_segment()),
        Err(e) => {
            trace!("Discarding sample from {}: {}", path, ProbeError::from(e));
            None
        }
    }
}
