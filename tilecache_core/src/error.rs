//! Errors raised by cache backends.
//!
//! Backends return `anyhow::Result`; the variants below are raised through it so that
//! callers can tell structural failures apart with `downcast_ref::<CacheError>()`.
//! A plain miss is never an error, it is a `false` return value.

use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of bound values in a single SQLite statement.
pub const MAX_BOUND_PARAMETERS: usize = 1000;

/// Maximum number of tiles in one batched lookup (three bound values per tile).
pub const MAX_BATCH_TILES: usize = MAX_BOUND_PARAMETERS / 3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
	/// No stored zoom level lies inside the tolerance window of the requested resolution.
	#[error("no stored zoom level within {tolerance} of resolution {resolution}")]
	NotFound { resolution: f64, tolerance: f64 },

	/// A batched lookup asked for more tiles than a single statement can bind.
	#[error(
		"cannot query SQLite for more than {max_tiles} tiles ({max_parameters} bound parameters), got {tiles} tiles",
		max_tiles = MAX_BATCH_TILES,
		max_parameters = MAX_BOUND_PARAMETERS
	)]
	BatchLimit { tiles: usize },

	/// The cache file could not be opened.
	#[error("cannot open {path:?}: {reason}")]
	Connection { path: PathBuf, reason: String },

	/// A connection was released while a handle to it was still held.
	#[error("connection to {path:?} is still in use")]
	ConnectionInUse { path: PathBuf },

	/// The requested level is not part of the caller's grid.
	#[error("level {level} is not part of the grid (levels 0..{levels})")]
	LevelOutOfRange { level: u8, levels: usize },

	/// A configured table name is not a plain SQL identifier.
	#[error("invalid table name {0:?}")]
	InvalidTableName(String),
}
