//! Shared building blocks for tile cache backends: tiles and their coordinates, the caller's
//! resolution grid, the [`TileCache`] trait, cache errors and the injected logging handle.

mod cache;
pub use cache::*;

mod error;
pub use error::*;

mod logger;
pub use logger::*;

pub mod types;
pub use types::*;
