//! `Tile` is the unit of work passed to cache backends.
//!
//! A tile has an optional coordinate and a few mutable slots that a backend fills in:
//! the encoded image ([`ImageSource`]), its byte size and a modification timestamp.
//!
//! A tile is *resolved* when it has no coordinate (nothing to look up) or already carries
//! a payload. Backends must not touch their storage for resolved tiles.

use super::{ImageSource, TileCoord};
use std::time::SystemTime;

/// Modification time of a cached tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileTimestamp {
	/// The backend does not record per-tile modification times.
	Untracked,
	/// The tile was last written at the given time.
	Modified(SystemTime),
}

/// A tile request together with whatever a cache backend loaded for it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tile {
	coord: Option<TileCoord>,
	source: Option<ImageSource>,
	size: Option<usize>,
	timestamp: Option<TileTimestamp>,
}

impl Tile {
	/// Create an empty tile for `coord`.
	///
	/// ```
	/// use tilecache_core::{Tile, TileCoord};
	///
	/// let tile = Tile::new(Some(TileCoord::new(4, 0, 0)));
	/// assert!(tile.is_missing());
	///
	/// let none = Tile::new(None);
	/// assert!(none.is_resolved());
	/// ```
	#[must_use]
	pub fn new(coord: Option<TileCoord>) -> Tile {
		Tile {
			coord,
			..Tile::default()
		}
	}

	/// Create an empty tile at `(x, y, level)`.
	#[must_use]
	pub fn at(x: i64, y: i64, level: u8) -> Tile {
		Tile::new(Some(TileCoord::new(level, x, y)))
	}

	#[must_use]
	pub fn coord(&self) -> Option<&TileCoord> {
		self.coord.as_ref()
	}

	#[must_use]
	pub fn source(&self) -> Option<&ImageSource> {
		self.source.as_ref()
	}

	/// Byte size of the loaded payload, when the backend reported one.
	#[must_use]
	pub fn size(&self) -> Option<usize> {
		self.size
	}

	#[must_use]
	pub fn timestamp(&self) -> Option<TileTimestamp> {
		self.timestamp
	}

	/// Store a loaded payload. The size is taken from the payload.
	pub fn set_source(&mut self, source: ImageSource) {
		self.size = Some(source.len());
		self.source = Some(source);
	}

	/// Remove the payload and return it.
	pub fn take_source(&mut self) -> Option<ImageSource> {
		self.size = None;
		self.source.take()
	}

	pub fn set_timestamp(&mut self, timestamp: TileTimestamp) {
		self.timestamp = Some(timestamp);
	}

	/// True if nothing needs to be loaded: either there is no coordinate or a payload is present.
	#[must_use]
	pub fn is_resolved(&self) -> bool {
		self.coord.is_none() || self.source.is_some()
	}

	/// True if the tile has a coordinate but no payload.
	#[must_use]
	pub fn is_missing(&self) -> bool {
		!self.is_resolved()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolution_state() {
		let mut tile = Tile::at(0, 0, 4);
		assert!(tile.is_missing());
		assert_eq!(tile.size(), None);

		tile.set_source(ImageSource::from(vec![0; 12]));
		assert!(tile.is_resolved());
		assert_eq!(tile.size(), Some(12));

		let source = tile.take_source();
		assert_eq!(source.map(|s| s.len()), Some(12));
		assert!(tile.is_missing());
		assert_eq!(tile.size(), None);
	}

	#[test]
	fn coordinate_less_tile_is_resolved() {
		let tile = Tile::new(None);
		assert!(tile.is_resolved());
		assert!(!tile.is_missing());
		assert_eq!(tile.coord(), None);
	}

	#[test]
	fn timestamp() {
		let mut tile = Tile::at(1, 2, 3);
		assert_eq!(tile.timestamp(), None);
		tile.set_timestamp(TileTimestamp::Untracked);
		assert_eq!(tile.timestamp(), Some(TileTimestamp::Untracked));
	}
}
