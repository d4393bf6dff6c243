//! GeoPackage fixtures for tests.
//!
//! Compiled for this crate's tests and, through the `test` feature, for downstream test suites.
//!
//! The default fixture holds:
//! - `gpkg_tile_matrix` rows for table `tiles`: zoom 0 → 1600.0, zoom 1 → 390.0, zoom 4 → 100.0
//! - tiles at (0, 0, 4), (0, 0, 1) and (0, 1, 1)
//!
//! Paired with [`test_grid`] (`[800, 400, 200, 150, 100, 50, 25, 12.5]`), caller levels 1, 3
//! and 4 resolve to stored zooms 1, 4 and 4; levels 0, 2, 5, 6 and 7 have no match.

use anyhow::Result;
use r2d2::ManageConnection;
use r2d2_sqlite::{SqliteConnectionManager, rusqlite::params};
use std::path::{Path, PathBuf};
use tilecache_core::TileGrid;

/// File name of the default fixture inside the directory passed to [`write_default_fixture`].
pub const DEFAULT_FIXTURE: &str = "fixture.gpkg";

/// The caller grid the default fixture is designed for.
#[must_use]
pub fn test_grid() -> TileGrid {
	TileGrid::from_resolutions(vec![800.0, 400.0, 200.0, 150.0, 100.0, 50.0, 25.0, 12.5])
}

/// A minimal PNG-looking payload; `id` makes payloads distinguishable.
#[must_use]
pub fn png_payload(id: u8) -> Vec<u8> {
	vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, id]
}

/// Writes the default fixture into `dir` and returns its path.
pub fn write_default_fixture(dir: &Path) -> Result<PathBuf> {
	let path = dir.join(DEFAULT_FIXTURE);
	FixtureBuilder::new("tiles")
		.matrix(0, 1600.0)
		.matrix(1, 390.0)
		.matrix(4, 100.0)
		.tile(0, 0, 4, png_payload(4))
		.tile(0, 0, 1, png_payload(10))
		.tile(0, 1, 1, png_payload(11))
		.write(&path)?;
	Ok(path)
}

/// Builds a GeoPackage file with one tile pyramid.
pub struct FixtureBuilder {
	table_name: String,
	matrix: Vec<(i64, f64)>,
	tiles: Vec<(i64, i64, i64, Vec<u8>)>,
}

impl FixtureBuilder {
	#[must_use]
	pub fn new(table_name: &str) -> FixtureBuilder {
		FixtureBuilder {
			table_name: table_name.to_string(),
			matrix: Vec::new(),
			tiles: Vec::new(),
		}
	}

	/// Adds a tile matrix row for stored `zoom_level` with `resolution` in both axes.
	#[must_use]
	pub fn matrix(mut self, zoom_level: i64, resolution: f64) -> Self {
		self.matrix.push((zoom_level, resolution));
		self
	}

	/// Adds a tile at `(column, row, zoom_level)`.
	#[must_use]
	pub fn tile(mut self, column: i64, row: i64, zoom_level: i64, data: Vec<u8>) -> Self {
		self.tiles.push((column, row, zoom_level, data));
		self
	}

	/// Writes the GeoPackage to `path`, replacing an existing file.
	pub fn write(&self, path: &Path) -> Result<()> {
		if path.exists() {
			std::fs::remove_file(path)?;
		}

		let mut conn = SqliteConnectionManager::file(path).connect()?;
		let table = &self.table_name;
		conn.execute_batch(&format!(
			"CREATE TABLE gpkg_contents (
				table_name TEXT NOT NULL PRIMARY KEY,
				data_type TEXT NOT NULL,
				identifier TEXT UNIQUE,
				srs_id INTEGER
			);
			CREATE TABLE gpkg_tile_matrix (
				table_name TEXT NOT NULL,
				zoom_level INTEGER NOT NULL,
				matrix_width INTEGER NOT NULL,
				matrix_height INTEGER NOT NULL,
				tile_width INTEGER NOT NULL,
				tile_height INTEGER NOT NULL,
				pixel_x_size DOUBLE NOT NULL,
				pixel_y_size DOUBLE NOT NULL,
				CONSTRAINT pk_ttm PRIMARY KEY (table_name, zoom_level)
			);
			CREATE TABLE \"{table}\" (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				zoom_level INTEGER NOT NULL,
				tile_column INTEGER NOT NULL,
				tile_row INTEGER NOT NULL,
				tile_data BLOB NOT NULL,
				UNIQUE (zoom_level, tile_column, tile_row)
			);"
		))?;

		let transaction = conn.transaction()?;
		transaction.execute(
			"INSERT INTO gpkg_contents (table_name, data_type, identifier, srs_id) VALUES (?1, 'tiles', ?1, 3857)",
			params![table],
		)?;
		for (zoom_level, resolution) in &self.matrix {
			let size = 1i64 << (*zoom_level).clamp(0, 30);
			transaction.execute(
				"INSERT INTO gpkg_tile_matrix VALUES (?1, ?2, ?3, ?3, 256, 256, ?4, ?4)",
				params![table, zoom_level, size, resolution],
			)?;
		}
		for (column, row, zoom_level, data) in &self.tiles {
			transaction.execute(
				&format!("INSERT INTO \"{table}\" (zoom_level, tile_column, tile_row, tile_data) VALUES (?1, ?2, ?3, ?4)"),
				params![zoom_level, column, row, data],
			)?;
		}
		transaction.commit()?;
		Ok(())
	}
}
