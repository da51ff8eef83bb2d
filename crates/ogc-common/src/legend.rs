//! Legends: classification rules for a feature property.
//!
//! Legends are published by the host application as a JSON descriptor:
//!
//! ```json
//! {
//!   "layer": {"id": 3, "name": "wells"},
//!   "legends": [
//!     {"property": "pop", "title": "Population", "type": "range",
//!      "entries": [{"lo": 0, "hi": 100, "color": "green", "label": "0 - 100"}]},
//!     {"property": "status", "title": "Status", "type": "category",
//!      "entries": [{"value": "dry", "color": "#ff0000", "label": "Dry"}]}
//!   ]
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A classification ruleset for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    /// Property the legend classifies
    pub property: String,

    /// Legend title shown above the swatches
    #[serde(default = "default_title")]
    pub title: String,

    /// Entries, tagged by legend type
    #[serde(flatten)]
    pub kind: LegendKind,
}

fn default_title() -> String {
    "legend".to_string()
}

/// Legend type with its entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LegendKind {
    /// Numeric buckets, ascending by upper threshold
    #[serde(rename = "range")]
    Range {
        #[serde(default)]
        entries: Vec<RangeEntry>,
    },

    /// Categorical values matched by equality
    #[serde(rename = "enumerated", alias = "category")]
    Enumerated {
        #[serde(default)]
        entries: Vec<ValueEntry>,
    },
}

/// A numeric bucket: matches values strictly below `threshold_high`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeEntry {
    /// Lower bound (informational, not used for matching)
    #[serde(default, rename = "lo", skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,

    /// Exclusive upper bound; `null` or "Infinity" means unbounded
    #[serde(rename = "hi", alias = "thresholdHigh", deserialize_with = "threshold")]
    pub threshold_high: f64,

    pub color: String,

    #[serde(default)]
    pub label: Option<String>,
}

impl RangeEntry {
    pub fn new(threshold_high: f64, color: impl Into<String>) -> Self {
        Self {
            low: None,
            threshold_high,
            color: color.into(),
            label: None,
        }
    }

    pub fn with_low(mut self, low: f64) -> Self {
        self.low = Some(low);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label, or a description of the bucket when none was given.
    pub fn display_label(&self) -> String {
        match (&self.label, self.low) {
            (Some(label), _) => label.clone(),
            (None, Some(low)) => format!("{} - {}", low, self.threshold_high),
            (None, None) => format!("< {}", self.threshold_high),
        }
    }
}

/// A categorical entry matched on equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    pub value: Value,

    pub color: String,

    #[serde(default)]
    pub label: Option<String>,
}

impl ValueEntry {
    pub fn new(value: impl Into<Value>, color: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            color: color.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_label(&self) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => crate::feature::display_value(&self.value),
        }
    }
}

fn threshold<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(f64::INFINITY),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom(format!("threshold {} out of range", n))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("invalid threshold '{}'", s))),
        other => Err(serde::de::Error::custom(format!(
            "invalid threshold {}",
            other
        ))),
    }
}

impl Legend {
    pub fn range(property: impl Into<String>, title: impl Into<String>, entries: Vec<RangeEntry>) -> Self {
        Self {
            property: property.into(),
            title: title.into(),
            kind: LegendKind::Range { entries },
        }
    }

    pub fn enumerated(
        property: impl Into<String>,
        title: impl Into<String>,
        entries: Vec<ValueEntry>,
    ) -> Self {
        Self {
            property: property.into(),
            title: title.into(),
            kind: LegendKind::Enumerated { entries },
        }
    }

    /// "range" or "enumerated"
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            LegendKind::Range { .. } => "range",
            LegendKind::Enumerated { .. } => "enumerated",
        }
    }

    pub fn len(&self) -> usize {
        match &self.kind {
            LegendKind::Range { entries } => entries.len(),
            LegendKind::Enumerated { entries } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (color, label) pairs in entry order, for legend rendering.
    pub fn swatches(&self) -> Vec<(String, String)> {
        match &self.kind {
            LegendKind::Range { entries } => entries
                .iter()
                .map(|e| (e.color.clone(), e.display_label()))
                .collect(),
            LegendKind::Enumerated { entries } => entries
                .iter()
                .map(|e| (e.color.clone(), e.display_label()))
                .collect(),
        }
    }

    /// Check the loader contract: range thresholds must be ascending.
    pub fn validate(&self) -> Result<(), String> {
        if let LegendKind::Range { entries } = &self.kind {
            for pair in entries.windows(2) {
                if pair[1].threshold_high < pair[0].threshold_high {
                    return Err(format!(
                        "{}: range thresholds must be ascending ({} after {})",
                        self.property, pair[1].threshold_high, pair[0].threshold_high
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Reference to the layer a descriptor belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendLayerRef {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Legend descriptor document: `{legends: [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<LegendLayerRef>,
    pub legends: Vec<Legend>,
}

/// Loaded legends for one layer, keyed by property.
///
/// Empty until a descriptor has been loaded; never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegendSet {
    legends: Vec<Legend>,
}

impl LegendSet {
    pub fn new(legends: Vec<Legend>) -> Self {
        Self { legends }
    }

    /// Legend for a property; the first one wins when a property repeats.
    pub fn get(&self, property: &str) -> Option<&Legend> {
        self.legends.iter().find(|l| l.property == property)
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.legends.iter().map(|l| l.property.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Legend> {
        self.legends.iter()
    }

    pub fn as_slice(&self) -> &[Legend] {
        &self.legends
    }

    pub fn len(&self) -> usize {
        self.legends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legends.is_empty()
    }
}

impl From<LegendDescriptor> for LegendSet {
    fn from(descriptor: LegendDescriptor) -> Self {
        Self::new(descriptor.legends)
    }
}
