//! Tile coordinates in the caller's own tile grid.
//!
//! A [`TileCoord`] names a tile by grid `level`, `x` (column) and `y` (row). Unlike a
//! Web Mercator pyramid index, nothing here assumes the level ladder of any particular
//! container: the level is an index into the caller's [`TileGrid`](crate::TileGrid),
//! and column/row are plain signed integers. Requests outside a container's coverage
//! (including negative columns) are valid coordinates that simply miss.
//!
//! # Examples
//!
//! ```
//! use tilecache_core::TileCoord;
//!
//! let coord = TileCoord::new(4, 0, 0);
//! assert_eq!(coord.level, 4);
//! assert_eq!(coord.as_tuple(), (0, 0, 4));
//! assert_eq!(format!("{coord:?}"), "TileCoord(4, [0, 0])");
//! ```

use std::fmt::{self, Debug, Display};

/// A tile coordinate with grid level, column and row.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	/// The level in the caller's grid.
	pub level: u8,
	/// The tile column.
	pub x: i64,
	/// The tile row.
	pub y: i64,
}

impl TileCoord {
	/// Create a new `TileCoord` at the given `level` and indices `x`, `y`.
	#[must_use]
	pub fn new(level: u8, x: i64, y: i64) -> TileCoord {
		TileCoord { level, x, y }
	}

	/// Returns `(x, y, level)`, the order used by cache backends.
	#[must_use]
	pub fn as_tuple(&self) -> (i64, i64, u8) {
		(self.x, self.y, self.level)
	}

	/// Returns the `(x, y)` pair, ignoring the level.
	#[must_use]
	pub fn column_row(&self) -> (i64, i64) {
		(self.x, self.y)
	}
}

impl From<(i64, i64, u8)> for TileCoord {
	fn from((x, y, level): (i64, i64, u8)) -> Self {
		TileCoord::new(level, x, y)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_tuple_keeps_order() {
		let coord = TileCoord::from((-1, 7, 3));
		assert_eq!(coord, TileCoord::new(3, -1, 7));
		assert_eq!(coord.as_tuple(), (-1, 7, 3));
		assert_eq!(coord.column_row(), (-1, 7));
	}

	#[test]
	fn formatting() {
		let coord = TileCoord::new(12, 2196, -5);
		assert_eq!(format!("{coord:?}"), "TileCoord(12, [2196, -5])");
		assert_eq!(coord.to_string(), "12/2196/-5");
	}
}
