//! GeoJSON features as delivered by WFS GetFeature.
//!
//! Geometry is carried through untouched; only ids and properties are
//! interpreted by this crate.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Feature properties, in the order the server sent them.
pub type Properties = Map<String, Value>;

/// A single GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature identifier (numeric ids are rendered as strings)
    #[serde(default, deserialize_with = "id_as_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Attribute values
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Properties,

    /// Opaque geometry payload
    #[serde(default)]
    pub geometry: Value,
}

impl Feature {
    pub fn new(properties: Properties) -> Self {
        Self {
            id: None,
            properties,
            geometry: Value::Null,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Value of a property; `None` when absent or JSON null.
    pub fn value(&self, property: &str) -> Option<&Value> {
        match self.properties.get(property) {
            Some(Value::Null) | None => None,
            Some(v) => Some(v),
        }
    }

    /// True when the property carries a displayable value (not null, not "").
    pub fn has_value(&self, property: &str) -> bool {
        self.value(property).map_or(false, |v| !is_blank(v))
    }
}

/// Ordered sequence of features.
pub type FeatureCollection = Vec<Feature>;

/// True for values that should be displayed as "no data".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Render a property value for tooltips and popups.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Properties, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Properties>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_id_becomes_string() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "id": 42,
            "geometry": {"type": "Point", "coordinates": [36.8, -1.3]},
            "properties": {"name": "Well 1"}
        }))
        .unwrap();
        assert_eq!(feature.id.as_deref(), Some("42"));
        assert_eq!(feature.value("name"), Some(&json!("Well 1")));
    }

    #[test]
    fn test_null_properties_are_empty() {
        let feature: Feature =
            serde_json::from_value(json!({"type": "Feature", "properties": null, "geometry": null}))
                .unwrap();
        assert!(feature.properties.is_empty());
        assert!(feature.id.is_none());
    }

    #[test]
    fn test_property_order_is_preserved() {
        let feature: Feature = serde_json::from_value(json!({
            "properties": {"zeta": 1, "alpha": 2, "mid": 3}
        }))
        .unwrap();
        let keys: Vec<&String> = feature.properties.keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_has_value() {
        let feature: Feature = serde_json::from_value(json!({
            "properties": {"a": null, "b": "", "c": 0, "d": "x"}
        }))
        .unwrap();
        assert!(!feature.has_value("a"));
        assert!(!feature.has_value("b"));
        assert!(feature.has_value("c"));
        assert!(feature.has_value("d"));
        assert!(!feature.has_value("missing"));
    }
}
