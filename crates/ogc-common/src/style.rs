//! Per-feature style, tooltip and popup content.
//!
//! This is the hand-off to the external renderer: a (color, radius, class)
//! triple plus the text a map widget would show for each feature.

use serde::{Deserialize, Serialize};

use crate::classify::{classify, NO_DATA_COLOR};
use crate::feature::{display_value, is_blank, Feature};
use crate::legend::Legend;

/// Marker radius for features that carry the active property.
pub const VALUE_RADIUS: u32 = 4;

/// Marker radius for features without a value for the active property.
pub const NO_VALUE_RADIUS: u32 = 2;

/// Popup title used when the layer has none.
pub const DEFAULT_POPUP_TITLE: &str = "Properties";

/// Marker style for one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStyle {
    /// Fill color
    pub color: String,
    /// Marker radius in pixels
    pub radius: u32,
    /// Legend class label
    pub class: String,
    /// Whether a white outline is drawn
    pub stroke: bool,
}

impl FeatureStyle {
    /// Style for a feature with no value for the property.
    pub fn no_value() -> Self {
        Self {
            color: NO_DATA_COLOR.to_string(),
            radius: NO_VALUE_RADIUS,
            class: crate::classify::NO_DATA_LABEL.to_string(),
            stroke: false,
        }
    }

    /// Style for a feature's value of `property`.
    pub fn for_feature(feature: &Feature, property: Option<&str>, legend: Option<&Legend>) -> Self {
        let value = match property.and_then(|p| feature.value(p)) {
            Some(value) => value,
            None => return Self::no_value(),
        };
        let classification = classify(Some(value), legend);
        Self {
            color: classification.color,
            radius: VALUE_RADIUS,
            class: classification.label,
            stroke: true,
        }
    }
}

/// Popup content: a title and (property, value) rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl Popup {
    /// Rows for every non-empty property, in feature order.
    pub fn for_feature(feature: &Feature, title: Option<&str>) -> Self {
        let rows = feature
            .properties
            .iter()
            .filter(|(_, value)| !is_blank(value))
            .map(|(name, value)| (name.clone(), display_value(value)))
            .collect();
        Self {
            title: title.unwrap_or(DEFAULT_POPUP_TITLE).to_string(),
            rows,
        }
    }
}

/// Everything the renderer needs for one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledFeature {
    /// Position of the feature in the loaded collection
    pub index: usize,
    pub id: Option<String>,
    pub style: FeatureStyle,
    /// "property: value" when a property is active
    pub tooltip: Option<String>,
    pub popup: Popup,
}

/// Style set computed for one (features, property) combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSet {
    pub property: Option<String>,
    pub features: Vec<StyledFeature>,
}

impl StyleSet {
    /// Derive styles for `features`.
    ///
    /// With an active property only features carrying a non-empty value for
    /// it are kept; without one every feature is kept.
    pub fn derive(
        features: &[Feature],
        property: Option<&str>,
        legend: Option<&Legend>,
        title: Option<&str>,
    ) -> Self {
        let styled = features
            .iter()
            .enumerate()
            .filter(|(_, f)| property.map_or(true, |p| f.has_value(p)))
            .map(|(index, feature)| StyledFeature {
                index,
                id: feature.id.clone(),
                style: FeatureStyle::for_feature(feature, property, legend),
                tooltip: property.and_then(|p| {
                    feature
                        .value(p)
                        .map(|v| format!("{}: {}", p, display_value(v)))
                }),
                popup: Popup::for_feature(feature, title),
            })
            .collect();

        Self {
            property: property.map(str::to_string),
            features: styled,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
