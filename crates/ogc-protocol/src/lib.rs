//! OGC WMS and WFS wire formats.
//!
//! Supports:
//! - ServiceExceptionReport decoding (WMS 1.3.0 / WFS 1.x)
//! - WMS 1.3.0 GetFeatureInfo point queries with XML responses
//! - WFS GetFeature requests with GeoJSON responses
//! - Legend descriptor documents

pub mod exceptions;
pub mod getfeature;
pub mod getfeatureinfo;
pub mod payload;
pub mod xml;

pub use exceptions::{
    decode_exception_report, exception_records, is_exception_report, starts_with_exception_report,
    OGC_NAMESPACE,
};
pub use getfeature::{decode_feature_collection, GetFeatureParams};
pub use getfeatureinfo::{
    decode_feature_info, feature_info_rows, FeatureInfoQuery, GetFeatureInfoParams, INFO_FORMAT,
    SYSTEM_EXCLUDES,
};
pub use payload::{classify_json, decode_legend_descriptor, Payload};
pub use xml::{parse_document, XmlElement};
