//! Numeric classification of cell values for the minimum/maximum summary.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("integer pattern is valid"));
static FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("float pattern is valid"));

/// A cell value as far as extrema are concerned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue {
    Integer(u64),
    Float(f64),
    /// Anything that is not a plain decimal number.
    Opaque,
}

impl CellValue {
    pub fn classify(raw: &str) -> Self {
        if INTEGER_RE.is_match(raw) {
            // Digits beyond u64 still order correctly as floats.
            match raw.parse() {
                Ok(n) => CellValue::Integer(n),
                Err(_) => raw.parse().map_or(CellValue::Opaque, CellValue::Float),
            }
        } else if FLOAT_RE.is_match(raw) {
            raw.parse().map_or(CellValue::Opaque, CellValue::Float)
        } else {
            CellValue::Opaque
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, CellValue::Opaque)
    }

    fn as_f64(&self) -> f64 {
        match *self {
            CellValue::Integer(n) => n as f64,
            CellValue::Float(x) => x,
            CellValue::Opaque => f64::NAN,
        }
    }

    /// Order two numeric values. Integers compare exactly with each other.
    fn numeric_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Integer(a), CellValue::Integer(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }
}

/// Running minimum and maximum of one column.
///
/// Only numeric cells take part. The reported extremum is the cell text as
/// it was stored; on ties the first one seen is kept.
#[derive(Debug, Clone, Default)]
pub struct Extrema<'a> {
    min: Option<(CellValue, &'a str)>,
    max: Option<(CellValue, &'a str)>,
}

impl<'a> Extrema<'a> {
    pub fn observe(&mut self, raw: &'a str) {
        let value = CellValue::classify(raw);
        if !value.is_numeric() {
            return;
        }
        if self
            .min
            .is_none_or(|(min, _)| value.numeric_cmp(&min) == Ordering::Less)
        {
            self.min = Some((value, raw));
        }
        if self
            .max
            .is_none_or(|(max, _)| value.numeric_cmp(&max) == Ordering::Greater)
        {
            self.max = Some((value, raw));
        }
    }

    pub fn min(&self) -> Option<&'a str> {
        self.min.map(|(_, raw)| raw)
    }

    pub fn max(&self) -> Option<&'a str> {
        self.max.map(|(_, raw)| raw)
    }
}
