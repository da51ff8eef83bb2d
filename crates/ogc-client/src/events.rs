//! Lifecycle notifications for feature loads and restyles.

use ogc_common::{OgcError, StyleSet};

/// Capacity of the per-client event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Emitted to subscribers; notifications only, never return values.
///
/// Every load emits `Loading` first, then exactly one of `Loaded` or
/// `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerEvent {
    /// A load started.
    Loading { layer: String },
    /// A load finished with `count` features.
    Loaded { layer: String, count: usize },
    /// A load failed.
    Failed { layer: String, error: OgcError },
    /// Styles were recomputed without network access.
    Restyled { layer: String, styles: StyleSet },
}

impl LayerEvent {
    pub fn layer(&self) -> &str {
        match self {
            LayerEvent::Loading { layer }
            | LayerEvent::Loaded { layer, .. }
            | LayerEvent::Failed { layer, .. }
            | LayerEvent::Restyled { layer, .. } => layer,
        }
    }

    /// Whether this event ends a load.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LayerEvent::Loaded { .. } | LayerEvent::Failed { .. })
    }
}
