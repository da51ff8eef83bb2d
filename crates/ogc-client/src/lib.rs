//! Data access for OGC map services.
//!
//! Fetches WFS features and legend descriptors through a session-scoped
//! response cache, issues WMS GetFeatureInfo point queries, and restyles
//! loaded features without going back to the network.
//!
//! ```ignore
//! let session = Session::connect(ClientConfig::from_env())?;
//! let legends = session.legend_catalog();
//! legends.load_legends("https://maps.example.com/legends/wells.json").await?;
//!
//! let layer = session
//!     .layer(LayerSource::wfs("https://maps.example.com/wfs", "wells"))
//!     .with_legends(legends);
//! layer.load(&[]).await?;
//! let styles = layer.set_active_property(Some("depth"));
//! ```

pub mod cache;
pub mod config;
pub mod events;
pub mod feature_info;
pub mod features;
pub mod layer;
pub mod legends;
pub mod session;
pub mod transport;

pub use cache::{canonical_url, CacheMode, CacheStats, Freshness, ResponseCache};
pub use config::ClientConfig;
pub use events::LayerEvent;
pub use feature_info::FeatureInfoClient;
pub use features::FeatureClient;
pub use layer::FilterableLayer;
pub use legends::LegendCatalog;
pub use session::Session;
pub use transport::ReqwestTransport;
