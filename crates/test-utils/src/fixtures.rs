//! Common test fixtures for OGC client tests.
//!
//! Canned server responses representing the shapes real GeoServer / MapServer
//! deployments send back.

/// Service endpoints used throughout the tests.
pub mod endpoints {
    /// WFS endpoint
    pub const WFS: &str = "http://maps.example.test/geoserver/wfs";

    /// WMS endpoint
    pub const WMS: &str = "http://maps.example.test/geoserver/wms";

    /// Legend descriptor document
    pub const LEGENDS: &str = "http://maps.example.test/legends/wells.json";
}

/// GeoJSON GetFeature responses.
pub mod geojson {
    /// Three wells with a numeric `depth` and a textual `status`. The third
    /// well has no depth.
    pub const WELLS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "id": "wells.1",
     "geometry": {"type": "Point", "coordinates": [36.8, -1.3]},
     "properties": {"name": "Kibera", "depth": 40, "status": "active"}},
    {"type": "Feature", "id": "wells.2",
     "geometry": {"type": "Point", "coordinates": [36.9, -1.2]},
     "properties": {"name": "Mathare", "depth": 120, "status": "dry"}},
    {"type": "Feature", "id": "wells.3",
     "geometry": {"type": "Point", "coordinates": [37.0, -1.1]},
     "properties": {"name": "Ruiru", "depth": null, "status": "active"}}
  ]
}"#;

    /// A valid collection without features.
    pub const EMPTY: &str = r#"{"type": "FeatureCollection", "features": []}"#;

    /// JSON that is not a feature collection.
    pub const NO_FEATURES_FIELD: &str = r#"{"type": "FeatureCollection", "totalFeatures": 0}"#;
}

/// ServiceExceptionReport documents.
pub mod exceptions {
    /// Unqualified report with a single coded exception.
    pub const INVALID_PARAMETER: &str = r#"<ServiceExceptionReport><ServiceException code="InvalidParameterValue">bad layer</ServiceException></ServiceExceptionReport>"#;

    /// Namespaced report behind an XML declaration.
    pub const LAYER_NOT_DEFINED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ServiceExceptionReport version="1.2.0" xmlns="http://www.opengis.net/ogc">
  <ServiceException code="LayerNotDefined">Unknown layer: roads</ServiceException>
</ServiceExceptionReport>"#;

    /// A report that carries no exception elements.
    pub const EMPTY_REPORT: &str = r#"<ServiceExceptionReport version="1.2.0"></ServiceExceptionReport>"#;
}

/// GetFeatureInfo XML responses.
pub mod feature_info {
    /// Single raster value.
    pub const RASTER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GetFeatureInfoResponse>
  <Layer name="elevation">
    <Attribute name="value_0" value="1523.5"/>
  </Layer>
</GetFeatureInfoResponse>"#;

    /// One vector feature with system ids and an empty attribute.
    pub const WELLS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GetFeatureInfoResponse>
  <Layer name="wells">
    <Feature id="wells.12">
      <Attribute name="fid" value="12"/>
      <Attribute name="ogc_fid" value="12"/>
      <Attribute name="name" value="Kibera"/>
      <Attribute name="depth" value="80"/>
      <Attribute name="notes" value=""/>
    </Feature>
  </Layer>
</GetFeatureInfoResponse>"#;
}

/// Legend descriptor documents.
pub mod legends {
    /// A range legend on `depth` and an enumerated legend on `status`.
    pub const WELLS: &str = r##"{
  "layer": {"id": 7, "name": "wells"},
  "legends": [
    {"property": "depth", "title": "Depth (m)", "type": "range",
     "entries": [
       {"lo": 0, "hi": 50, "color": "#0000ff", "label": "0 - 50"},
       {"lo": 50, "hi": 100, "color": "#ffc800", "label": "50 - 100"},
       {"lo": 100, "hi": null, "color": "#ff0000", "label": "100+"}
     ]},
    {"property": "status", "title": "Status", "type": "enumerated",
     "entries": [
       {"value": "active", "color": "#09d609", "label": "Active"},
       {"value": "dry", "color": "#888888", "label": "Dry"}
     ]}
  ]
}"##;

    /// Descriptor without a `legends` field.
    pub const MISSING_LEGENDS: &str = r#"{"layer": {"id": 7}}"#;
}

/// Client configuration files.
pub mod config {
    /// A YAML configuration overriding every field.
    pub const FULL_YAML: &str = r#"wfs_version: "2.0.0"
cache_namespace: "wfs-test"
cache_ttl_secs: 300
coalesce_requests: false
request_timeout_secs: 15
connect_timeout_secs: 5
user_agent: "ogc-test/1.0"
"#;

    /// Write `contents` to a named temporary file.
    pub fn temp_config_file(contents: &str) -> tempfile::NamedTempFile {
        use std::io::Write;

        let mut file = tempfile::Builder::new()
            .prefix("ogc-config-")
            .suffix(".yaml")
            .tempfile()
            .expect("Failed to create temp config file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp config file");
        file
    }
}
