//! Matching caller grid levels to stored GeoPackage zoom levels.
//!
//! A GeoPackage numbers its zoom levels on its own; only the pixel resolution recorded
//! in `gpkg_tile_matrix` ties them to the caller's grid. A stored level matches a caller
//! level `z` when `|r - p| < 0.5 * grid[z]`, where `r` is the requested resolution and
//! `p` the stored `pixel_x_size`. Of several matches the nearest wins; on an exact tie
//! the row SQLite returns first wins, so the choice follows the engine's scan order and
//! not the numeric zoom order.
//!
//! Nothing is cached: every lookup scans the tile matrix again.

use crate::TileTable;
use anyhow::{Context, Result};
use r2d2_sqlite::rusqlite::{Connection, params};
use tilecache_core::{CacheError, CacheLogger, TileGrid};

/// A row of `gpkg_tile_matrix`: a stored zoom level and its resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileMatrixEntry {
	pub zoom_level: i64,
	pub resolution: f64,
}

/// Picks the entry nearest to `resolution`. Earlier entries win ties.
#[must_use]
pub fn nearest_entry<I>(entries: I, resolution: f64) -> Option<TileMatrixEntry>
where
	I: IntoIterator<Item = TileMatrixEntry>,
{
	let mut best: Option<(TileMatrixEntry, f64)> = None;
	for entry in entries {
		let diff = (resolution - entry.resolution).abs();
		if best.is_none_or(|(_, best_diff)| diff < best_diff) {
			best = Some((entry, diff));
		}
	}
	best.map(|(entry, _)| entry)
}

pub struct ZoomResolver {
	table: TileTable,
	grid: TileGrid,
	log: CacheLogger,
}

impl ZoomResolver {
	#[must_use]
	pub fn new(table: TileTable, grid: TileGrid, log: CacheLogger) -> ZoomResolver {
		ZoomResolver { table, grid, log }
	}

	#[must_use]
	pub fn grid(&self) -> &TileGrid {
		&self.grid
	}

	/// Resolves the stored zoom level for caller `level`, requesting the grid's own
	/// resolution of that level.
	///
	/// # Errors
	/// Returns [`CacheError::LevelOutOfRange`] if the grid lacks `level` and
	/// [`CacheError::NotFound`] if no stored level matches.
	pub fn resolve_level(&self, conn: &Connection, level: u8) -> Result<i64> {
		let resolution = self.grid.resolution(level)?;
		self.resolve(conn, resolution, level)
	}

	/// Resolves the stored zoom level for `resolution`, using the tolerance of caller `level`.
	///
	/// # Errors
	/// Returns [`CacheError::LevelOutOfRange`] if the grid lacks `level` and
	/// [`CacheError::NotFound`] if no stored level matches.
	pub fn resolve(&self, conn: &Connection, resolution: f64, level: u8) -> Result<i64> {
		let tolerance = self.grid.tolerance(level)?;

		let mut stmt = conn
			.prepare(
				"SELECT zoom_level, pixel_x_size FROM gpkg_tile_matrix WHERE table_name = ?1 AND ABS(pixel_x_size - ?2) < ?3",
			)
			.context("reading gpkg_tile_matrix")?;
		let candidates = stmt
			.query_map(params![self.table.as_str(), resolution, tolerance], |row| {
				Ok(TileMatrixEntry {
					zoom_level: row.get(0)?,
					resolution: row.get(1)?,
				})
			})?
			.collect::<Result<Vec<_>, _>>()?;

		let Some(entry) = nearest_entry(candidates, resolution) else {
			self.log.debug(format_args!(
				"no stored zoom level of {} within {tolerance} of {resolution} (level {level})",
				self.table
			));
			return Err(CacheError::NotFound { resolution, tolerance }.into());
		};

		self.log.trace(format_args!(
			"level {level} ({resolution}) resolves to zoom level {} ({})",
			entry.zoom_level, entry.resolution
		));
		Ok(entry.zoom_level)
	}

	/// All tile matrix entries of the table, ordered by zoom level.
	pub fn tile_matrix(&self, conn: &Connection) -> Result<Vec<TileMatrixEntry>> {
		let mut stmt = conn
			.prepare("SELECT zoom_level, pixel_x_size FROM gpkg_tile_matrix WHERE table_name = ?1 ORDER BY zoom_level")
			.context("reading gpkg_tile_matrix")?;
		let entries = stmt
			.query_map(params![self.table.as_str()], |row| {
				Ok(TileMatrixEntry {
					zoom_level: row.get(0)?,
					resolution: row.get(1)?,
				})
			})?
			.collect::<Result<Vec<_>, _>>()?;
		Ok(entries)
	}
}

/// True if `err` is a [`CacheError::NotFound`].
pub(crate) fn is_not_found(err: &anyhow::Error) -> bool {
	matches!(err.downcast_ref::<CacheError>(), Some(CacheError::NotFound { .. }))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{FixtureBuilder, test_grid, write_default_fixture};
	use r2d2::ManageConnection;
	use r2d2_sqlite::SqliteConnectionManager;
	use rstest::rstest;
	use std::path::Path;
	use tempfile::tempdir;

	fn entry(zoom_level: i64, resolution: f64) -> TileMatrixEntry {
		TileMatrixEntry { zoom_level, resolution }
	}

	fn connect(path: &Path) -> Connection {
		SqliteConnectionManager::file(path).connect().unwrap()
	}

	fn resolver(table: &str) -> ZoomResolver {
		ZoomResolver::new(TileTable::parse(table).unwrap(), test_grid(), CacheLogger::default())
	}

	#[test]
	fn nearest_prefers_smallest_difference() {
		let entries = vec![entry(7, 60.0), entry(8, 45.0), entry(10, 27.0)];
		assert_eq!(nearest_entry(entries, 50.0), Some(entry(8, 45.0)));
	}

	#[test]
	fn nearest_keeps_first_on_tie() {
		assert_eq!(nearest_entry(vec![entry(11, 23.0), entry(10, 27.0)], 25.0), Some(entry(11, 23.0)));
		assert_eq!(nearest_entry(vec![entry(10, 27.0), entry(11, 23.0)], 25.0), Some(entry(10, 27.0)));
		assert_eq!(nearest_entry(vec![], 25.0), None);
	}

	// default fixture: stored zoom 0 → 1600, 1 → 390, 4 → 100; grid [800, 400, 200, 150, 100, 50, 25, 12.5]
	#[rstest]
	#[case(1, Some(1))]
	#[case(3, Some(4))]
	#[case(4, Some(4))]
	#[case(0, None)]
	#[case(2, None)]
	#[case(7, None)]
	fn resolve_levels(#[case] level: u8, #[case] expected: Option<i64>) -> Result<()> {
		let dir = tempdir()?;
		let conn = connect(&write_default_fixture(dir.path())?);

		match resolver("tiles").resolve_level(&conn, level) {
			Ok(zoom) => assert_eq!(Some(zoom), expected),
			Err(err) => {
				assert!(is_not_found(&err), "unexpected error {err}");
				assert_eq!(expected, None);
			}
		}
		Ok(())
	}

	#[test]
	fn window_is_exclusive() -> Result<()> {
		let dir = tempdir()?;
		let conn = connect(&write_default_fixture(dir.path())?);

		// level 2 has resolution 200 and tolerance 100; the stored 100.0 is exactly 100 away
		let err = resolver("tiles").resolve_level(&conn, 2).unwrap_err();
		assert_eq!(
			err.downcast_ref::<CacheError>(),
			Some(&CacheError::NotFound {
				resolution: 200.0,
				tolerance: 100.0
			})
		);

		// an explicit resolution inside the window of level 2 matches
		assert_eq!(resolver("tiles").resolve(&conn, 180.0, 2)?, 4);
		Ok(())
	}

	#[test]
	fn several_candidates() -> Result<()> {
		let dir = tempdir()?;
		let path = dir.path().join("candidates.gpkg");
		FixtureBuilder::new("tiles")
			.matrix(10, 27.0)
			.matrix(11, 23.0)
			.matrix(7, 60.0)
			.matrix(8, 45.0)
			.write(&path)?;
		let conn = connect(&path);
		let resolver = resolver("tiles");

		// level 5: 50 ± 25 → 60, 45 and 27 qualify, 45 is nearest
		assert_eq!(resolver.resolve_level(&conn, 5)?, 8);
		// level 6: 25 ± 12.5 → 27 and 23 are equally near, the first scanned row wins
		assert_eq!(resolver.resolve_level(&conn, 6)?, 10);
		Ok(())
	}

	#[test]
	fn unknown_level_is_an_error() -> Result<()> {
		let dir = tempdir()?;
		let conn = connect(&write_default_fixture(dir.path())?);

		let err = resolver("tiles").resolve_level(&conn, 8).unwrap_err();
		assert!(!is_not_found(&err));
		assert_eq!(
			err.downcast_ref::<CacheError>(),
			Some(&CacheError::LevelOutOfRange { level: 8, levels: 8 })
		);
		Ok(())
	}

	#[test]
	fn other_tables_are_ignored() -> Result<()> {
		let dir = tempdir()?;
		let conn = connect(&write_default_fixture(dir.path())?);

		assert!(is_not_found(&resolver("other").resolve_level(&conn, 4).unwrap_err()));
		assert!(resolver("other").tile_matrix(&conn)?.is_empty());
		Ok(())
	}

	#[test]
	fn tile_matrix_lists_all_levels() -> Result<()> {
		let dir = tempdir()?;
		let conn = connect(&write_default_fixture(dir.path())?);

		assert_eq!(
			resolver("tiles").tile_matrix(&conn)?,
			vec![entry(0, 1600.0), entry(1, 390.0), entry(4, 100.0)]
		);
		Ok(())
	}
}
