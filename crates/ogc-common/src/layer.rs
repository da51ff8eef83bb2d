//! Layer sources for OWS servers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// OGC service protocol spoken by a layer's server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceType {
    Wms,
    Wfs,
}

impl ServiceType {
    /// Parse from a service string ("WMS", "wfs", ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "WMS" => Some(ServiceType::Wms),
            "WFS" => Some(ServiceType::Wfs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Wms => "WMS",
            ServiceType::Wfs => "WFS",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Property names a caller wants to see, in the order given.
///
/// An empty list means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyAllowList(Vec<String>);

impl PropertyAllowList {
    /// Parse a comma separated `propertyName` option ("name, pop ,area").
    pub fn parse(s: &str) -> Self {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the list is empty or names `property`.
    pub fn allows(&self, property: &str) -> bool {
        self.0.is_empty() || self.0.iter().any(|p| p == property)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Comma joined form used for the WMS `propertyName` parameter.
    pub fn to_param(&self) -> String {
        self.iter().collect::<Vec<_>>().join(",")
    }
}

// Repeated names keep their first position.
impl<S: Into<String>> FromIterator<S> for PropertyAllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in iter.into_iter().map(Into::into) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Self(names)
    }
}

/// A queryable layer on a WMS or WFS server.
///
/// Immutable once bound to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSource {
    /// Service endpoint URL
    pub url: String,
    /// Protocol spoken by the endpoint
    pub service_type: ServiceType,
    /// Layer (type) name used in queries
    pub query_layer_name: String,
    /// Optional human readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Properties to show in feature info results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_allow_list: Option<PropertyAllowList>,
}

impl LayerSource {
    pub fn wfs(url: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_type: ServiceType::Wfs,
            query_layer_name: layer.into(),
            title: None,
            property_allow_list: None,
        }
    }

    pub fn wms(url: impl Into<String>, layer: impl Into<String>) -> Self {
        Self {
            service_type: ServiceType::Wms,
            ..Self::wfs(url, layer)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_allow_list(mut self, allow_list: PropertyAllowList) -> Self {
        self.property_allow_list = Some(allow_list);
        self
    }

    /// Title if present, otherwise the layer name.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.query_layer_name)
    }
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.url, self.query_layer_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allow_list() {
        let list = PropertyAllowList::parse("name, pop ,, area, pop");
        assert!(list.allows("pop"));
        assert!(list.allows("area"));
        assert!(!list.allows("fid"));
        assert_eq!(list.to_param(), "name,pop,area");
    }

    #[test]
    fn test_empty_allow_list_allows_everything() {
        let list = PropertyAllowList::parse("  ");
        assert!(list.is_empty());
        assert!(list.allows("anything"));
    }

    #[test]
    fn test_service_type_parse() {
        assert_eq!(ServiceType::parse("wfs"), Some(ServiceType::Wfs));
        assert_eq!(ServiceType::parse("WMS"), Some(ServiceType::Wms));
        assert_eq!(ServiceType::parse("WCS"), None);
    }

    #[test]
    fn test_display_name_falls_back_to_layer() {
        let source = LayerSource::wms("http://example.com/ows", "wells");
        assert_eq!(source.display_name(), "wells");
        assert_eq!(source.with_title("Wells").display_name(), "Wells");
    }
}
