//! Generators for synthetic feature collections.
//!
//! Features are laid out on a diagonal so geometry is distinct per feature,
//! and ids follow `layer.N` starting at 1.

use serde_json::{json, Value};

/// Creates a GeoJSON FeatureCollection body with one feature per value of
/// `property`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use test_utils::feature_collection_json;
///
/// let body = feature_collection_json("pop", &[json!(5), json!(50)]);
/// assert!(body.contains("\"pop\":50"));
/// ```
pub fn feature_collection_json(property: &str, values: &[Value]) -> String {
    let features: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            json!({
                "type": "Feature",
                "id": format!("layer.{}", i + 1),
                "geometry": point(i),
                "properties": { property: value },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

fn point(i: usize) -> Value {
    let offset = i as f64 * 0.01;
    json!({ "type": "Point", "coordinates": [36.8 + offset, -1.3 + offset] })
}
