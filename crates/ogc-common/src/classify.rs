//! Legend-driven classification of property values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::legend::{Legend, LegendKind, RangeEntry, ValueEntry};

/// Color used when a value cannot be classified.
pub const NO_DATA_COLOR: &str = "gray";

/// Label used when a value cannot be classified.
pub const NO_DATA_LABEL: &str = "no data";

/// Outcome of classifying one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub color: String,
    pub label: String,
    /// False for the "no data" fallback and the open upper range bucket
    pub matched: bool,
}

impl Classification {
    pub fn no_data() -> Self {
        Self {
            color: NO_DATA_COLOR.to_string(),
            label: NO_DATA_LABEL.to_string(),
            matched: false,
        }
    }

    fn from_range(entry: &RangeEntry, matched: bool) -> Self {
        Self {
            color: entry.color.clone(),
            label: entry.display_label(),
            matched,
        }
    }

    fn from_value(entry: &ValueEntry) -> Self {
        Self {
            color: entry.color.clone(),
            label: entry.display_label(),
            matched: true,
        }
    }

    pub fn is_no_data(&self) -> bool {
        !self.matched && self.color == NO_DATA_COLOR && self.label == NO_DATA_LABEL
    }
}

/// Map a property value to a color and label.
///
/// - missing/null value or missing legend: gray "no data"
/// - range legend: first entry with `threshold_high > value`, otherwise the
///   last entry (open upper bucket)
/// - enumerated legend: first entry strictly equal to the value (`"3"` and
///   `3` differ), otherwise "no data"
pub fn classify(value: Option<&Value>, legend: Option<&Legend>) -> Classification {
    let (value, legend) = match (value, legend) {
        (Some(Value::Null), _) | (None, _) | (_, None) => return Classification::no_data(),
        (Some(v), Some(l)) => (v, l),
    };

    match &legend.kind {
        LegendKind::Range { entries } => match numeric(value) {
            Some(x) => classify_range(x, entries),
            None => Classification::no_data(),
        },
        LegendKind::Enumerated { entries } => entries
            .iter()
            .find(|e| e.value == *value)
            .map(Classification::from_value)
            .unwrap_or_else(Classification::no_data),
    }
}

/// Range lookup for a numeric value.
pub fn classify_range(value: f64, entries: &[RangeEntry]) -> Classification {
    if value.is_nan() {
        return Classification::no_data();
    }
    if let Some(entry) = entries.iter().find(|e| e.threshold_high > value) {
        return Classification::from_range(entry, true);
    }
    match entries.last() {
        Some(last) => Classification::from_range(last, false),
        None => Classification::no_data(),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
