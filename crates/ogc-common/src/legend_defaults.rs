//! Default legends derived from the values of a property.
//!
//! Numeric properties get four quartile buckets; categorical properties get
//! one entry per distinct value, colored along a blue-to-red hue ramp.

use serde_json::Value;

use crate::feature::{display_value, Feature};
use crate::legend::{Legend, RangeEntry, ValueEntry};
use crate::{OgcError, OgcResult};

/// Quantiles used as class boundaries for numeric legends.
pub const QUARTILES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Bucket colors for numeric legends, lowest first.
pub const QUARTILE_COLORS: [&str; 4] = ["#0000ff", "#09d609", "#ffc800", "#ff0000"];

/// More distinct values than this cannot be classified.
pub const MAX_CATEGORIES: usize = 24;

/// Longest categorical label kept in a legend entry.
const MAX_LABEL_CHARS: usize = 40;

/// Property names never given a default legend: identifiers, coordinates
/// and free text. Compared case-insensitively.
pub const EXCLUDED_PROPERTIES: [&str; 18] = [
    "fid", "ogc_fid", "no", "nr", "id", "sn", "x", "y", "adindanx", "adindany", "remarks",
    "remark", "lon", "lat", "longitude", "latitude", "easting", "northing",
];

/// Builds a default legend for a property.
#[derive(Debug, Clone)]
pub struct LegendBuilder {
    property: String,
    title: String,
}

impl LegendBuilder {
    pub fn new(property: impl Into<String>) -> Self {
        let property = property.into();
        Self {
            title: property.clone(),
            property,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Build from the property values of a feature collection.
    pub fn from_features(&self, features: &[Feature]) -> OgcResult<Option<Legend>> {
        let values: Vec<Value> = features
            .iter()
            .filter_map(|f| f.value(&self.property).cloned())
            .collect();
        self.from_values(&values)
    }

    /// Build from raw values.
    ///
    /// Returns `Ok(None)` when there is not enough data to classify (fewer
    /// than two values, or a single distinct category).
    pub fn from_values(&self, values: &[Value]) -> OgcResult<Option<Legend>> {
        let values: Vec<&Value> = values.iter().filter(|v| !v.is_null()).collect();
        if values.len() < 2 {
            return Ok(None);
        }

        let numbers: Option<Vec<f64>> = values.iter().map(|v| v.as_f64()).collect();
        match numbers {
            Some(numbers) => Ok(Some(self.quartile_legend(numbers))),
            None => self.category_legend(&values),
        }
    }

    fn quartile_legend(&self, mut numbers: Vec<f64>) -> Legend {
        numbers.sort_by(|a, b| a.total_cmp(b));
        let limits: Vec<f64> = QUARTILES.iter().map(|q| quantile(&numbers, *q)).collect();

        let mut lo = limits[0];
        let entries = limits[1..]
            .iter()
            .zip(QUARTILE_COLORS)
            .map(|(&hi, color)| {
                let entry = RangeEntry::new(hi, color)
                    .with_low(lo)
                    .with_label(format!("{} - {}", format_bound(lo), format_bound(hi)));
                lo = hi;
                entry
            })
            .collect();

        Legend::range(self.property.clone(), self.title.clone(), entries)
    }

    fn category_legend(&self, values: &[&Value]) -> OgcResult<Option<Legend>> {
        let mut unique: Vec<&Value> = Vec::new();
        for value in values {
            if !unique.contains(value) {
                unique.push(value);
            }
        }
        if unique.len() < 2 {
            return Ok(None);
        }
        if unique.len() > MAX_CATEGORIES {
            return Err(OgcError::InvalidLegend(format!(
                "{} is not numeric and has too many unique values ({}) to classify",
                self.property,
                unique.len()
            )));
        }

        let last = (unique.len() - 1) as f64;
        let entries = unique
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let label: String = display_value(value).chars().take(MAX_LABEL_CHARS).collect();
                ValueEntry::new(Value::clone(value), hue_ramp(index as f64 / last))
                    .with_label(label)
            })
            .collect();

        Ok(Some(Legend::enumerated(
            self.property.clone(),
            self.title.clone(),
            entries,
        )))
    }
}

/// Default legends for every classifiable property of a collection.
///
/// Properties are visited in order of first appearance. Excluded names are
/// skipped, as are properties without enough data or with too many distinct
/// values; the latter are reported alongside the legends.
pub fn default_legends(features: &[Feature]) -> OgcResult<(Vec<Legend>, Vec<OgcError>)> {
    if features.is_empty() {
        return Err(OgcError::EmptyCollection);
    }

    let mut properties: Vec<&str> = Vec::new();
    for feature in features {
        for name in feature.properties.keys() {
            if !properties.contains(&name.as_str()) {
                properties.push(name);
            }
        }
    }

    let mut legends = Vec::new();
    let mut skipped = Vec::new();
    for property in properties {
        if is_excluded(property) {
            continue;
        }
        match LegendBuilder::new(property).from_features(features) {
            Ok(Some(legend)) => legends.push(legend),
            Ok(None) => {}
            Err(e) => skipped.push(e),
        }
    }
    Ok((legends, skipped))
}

/// Whether `property` is never given a default legend.
pub fn is_excluded(property: &str) -> bool {
    EXCLUDED_PROPERTIES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(property))
}

/// Linear-interpolated quantile of sorted data.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// Hex color for a position on the blue (0.0) to red (1.0) ramp.
pub fn hue_ramp(position: f64) -> String {
    let hue = 0.6667 * (1.0 - position.clamp(0.0, 1.0));
    let (r, g, b) = hsv_to_rgb(hue, 1.0, 1.0);
    format!(
        "#{:02x}{:02x}{:02x}",
        (r * 255.0) as u8,
        (g * 255.0) as u8,
        (b * 255.0) as u8
    )
}

fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

// Six significant digits, trailing zeros dropped.
fn format_bound(x: f64) -> String {
    if !x.is_finite() || x == 0.0 {
        return format!("{}", x);
    }
    let magnitude = x.abs().log10().floor() as i32;
    let decimals = (5 - magnitude).max(0) as usize;
    let s = format!("{:.*}", decimals, x);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
