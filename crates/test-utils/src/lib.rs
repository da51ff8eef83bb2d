//! Shared test utilities for the ogc-feature-layer workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A scripted in-memory [`MockTransport`]
//! - Feature collection generators
//! - Canned server responses (GeoJSON, exception reports, GetFeatureInfo)
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, MockTransport};
//! ```

pub mod fixtures;
pub mod generators;
pub mod transport;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use transport::*;

/// Macro asserting that a result failed with the given error kind.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_err_kind;
///
/// assert_err_kind!(layer.load().await, "service_exception");
/// ```
#[macro_export]
macro_rules! assert_err_kind {
    ($result:expr, $kind:expr) => {{
        match $result {
            Ok(_) => panic!("expected error of kind `{}`, got Ok", $kind),
            Err(e) => assert_eq!(e.kind(), $kind, "unexpected error: {}", e),
        }
    }};
}
