//! Common types shared across the OGC feature layer crates.
//!
//! - layer sources and property allow-lists
//! - GeoJSON features (geometry kept opaque)
//! - legends and the value classifier
//! - per-feature style derivation handed to renderers
//! - the error taxonomy and the outbound transport seam

pub mod classify;
pub mod error;
pub mod feature;
pub mod layer;
pub mod legend;
pub mod legend_defaults;
pub mod records;
pub mod style;
pub mod transport;

pub use classify::{classify, Classification, NO_DATA_COLOR, NO_DATA_LABEL};
pub use error::{OgcError, OgcResult};
pub use feature::{Feature, FeatureCollection, Properties};
pub use layer::{LayerSource, PropertyAllowList, ServiceType};
pub use legend::{Legend, LegendDescriptor, LegendKind, LegendSet, RangeEntry, ValueEntry};
pub use legend_defaults::{default_legends, LegendBuilder};
pub use records::{ExceptionRecord, InfoRow};
pub use style::{FeatureStyle, Popup, StyleSet, StyledFeature};
pub use transport::{body_text, HttpResponse, Transport};
