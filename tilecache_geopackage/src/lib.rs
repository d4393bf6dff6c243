//! Read-only tile cache backed by a GeoPackage file.
//!
//! - [`GeoPackageCache`]: single and batched tile lookups in the caller's grid
//! - [`ZoomResolver`]: maps caller levels to stored zoom levels by resolution
//! - [`ConnectionManager`]: one explicitly released SQLite connection per thread
//! - [`BatchQuery`]: the disjunctive multi-tile statement and its parameter ceiling
//! - [`GeoPackageConfig`]: YAML configuration
//!
//! # Features
//! - `test`: exposes the [`testing`] module with GeoPackage fixture writers.

mod cache;
pub use cache::*;

mod config;
pub use config::*;

mod connection;
pub use connection::*;

mod query;
pub use query::*;

mod zoom;
pub use zoom::{TileMatrixEntry, ZoomResolver, nearest_entry};

#[cfg(any(test, feature = "test"))]
pub mod testing;
