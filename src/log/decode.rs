use crate::config::Filters;
use crate::log::record::{Entry, Record};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Marks a line written by the WMP memory sampler.
pub const MARKER: &str = " wmp_memory_current: ";

/// Lines announcing sampler shutdown carry the marker but no data.
pub const EXIT_MARKER: &str = "Exiting.";

/// Value reported for a parameter the cgroup does not provide.
pub const NO_DATA: &str = "-";

// timestamp  hostname  wmp_memory_current:  payload...
static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+\S+\s+\S+\s+(.*)$").expect("line pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),
    #[error("malformed section {0:?}")]
    Section(String),
    #[error("malformed pair {0:?}")]
    Pair(String),
    #[error("value {value:?} of {param} is not an integer")]
    Value { param: String, value: String },
}

/// A line that carried the marker but could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error \"{source}\" parsing line: {line}")]
pub struct LineError {
    pub line: String,
    pub source: DecodeError,
}

/// Turns raw log lines into records, applying the configured filters.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    filters: Filters,
}

impl Decoder {
    pub fn new(filters: Filters) -> Self {
        Self { filters }
    }

    /// Decode one raw line.
    ///
    /// Returns `Ok(None)` for lines that are not WMP samples or are excluded by
    /// the timestamp filter. A malformed line yields no entries at all.
    pub fn decode(&self, line: &str) -> Result<Option<Record>, LineError> {
        self.decode_line(line).map_err(|source| LineError {
            line: line.trim().to_string(),
            source,
        })
    }

    fn decode_line(&self, line: &str) -> Result<Option<Record>, DecodeError> {
        if !line.contains(MARKER) || line.contains(EXIT_MARKER) {
            return Ok(None);
        }

        let line = line.trim();
        let caps = LINE_RE
            .captures(line)
            .ok_or_else(|| DecodeError::FieldCount(line.split_whitespace().count()))?;
        let timestamp = &caps[1];
        let payload = caps.get(2).map_or("", |m| m.as_str());

        if !self.filters.accepts_timestamp(timestamp) {
            return Ok(None);
        }

        let mut entries = Vec::new();
        for section in payload.split(',') {
            let (cgroup, pairs) =
                split_exact(section, ':').ok_or_else(|| DecodeError::Section(section.to_string()))?;
            let cgroup = cgroup.trim();
            if !self.filters.accepts_cgroup(cgroup) {
                continue;
            }

            for pair in pairs.split_whitespace() {
                let (param, value) =
                    split_exact(pair, '=').ok_or_else(|| DecodeError::Pair(pair.to_string()))?;
                if !self.filters.accepts_param(param) || value == NO_DATA {
                    continue;
                }
                entries.push(Entry {
                    cgroup: cgroup.to_string(),
                    param: param.to_string(),
                    value: self.scale(param, value)?,
                });
            }
        }

        Ok(Some(Record {
            timestamp: timestamp.to_string(),
            entries,
        }))
    }

    fn scale(&self, param: &str, value: &str) -> Result<String, DecodeError> {
        let divisor = self.filters.divisor;
        if divisor == 1 {
            return Ok(value.to_string());
        }
        let raw: i128 = value.parse().map_err(|_| DecodeError::Value {
            param: param.to_string(),
            value: value.to_string(),
        })?;
        Ok(format!("{:.1}", raw as f64 / divisor as f64))
    }
}

/// Split on `sep`, requiring exactly one occurrence.
fn split_exact(s: &str, sep: char) -> Option<(&str, &str)> {
    let (head, tail) = s.split_once(sep)?;
    if tail.contains(sep) {
        return None;
    }
    Some((head, tail))
}
