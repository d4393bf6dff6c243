//! Read tiles from a GeoPackage tile pyramid.
//!
//! [`GeoPackageCache`] answers lookups in the caller's grid. Each lookup first resolves
//! the caller level to a stored zoom level by resolution (see [`ZoomResolver`]) and then
//! queries the tile table: one point query for [`load_tile`](TileCache::load_tile), one
//! disjunctive query for [`load_tiles`](TileCache::load_tiles).
//!
//! ## Batches
//! A batch binds three values per tile and SQLite statements are limited to
//! [`MAX_BOUND_PARAMETERS`](tilecache_core::MAX_BOUND_PARAMETERS), so at most 333 tiles can be
//! looked up at once. Larger batches fail with [`CacheError::BatchLimit`] before the
//! file is touched. All tiles of a batch are expected to share one level; the level of
//! the first tile that still needs its payload is used for the whole batch.
//!
//! Tiles sharing a column and row collapse to one lookup. Only the last of them in input
//! order receives the payload.
//!
//! ## Threads
//! Every thread reads through its own connection, opened on its first lookup. Call
//! [`cleanup`](TileCache::cleanup) from a worker before it ends.
//!
//! ## Example
//! ```rust,no_run
//! use tilecache_core::{CacheLogger, Tile, TileCache, TileGrid};
//! use tilecache_geopackage::GeoPackageCache;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let grid = TileGrid::web_mercator(20, 256);
//!     let cache = GeoPackageCache::new(Path::new("/data/world.gpkg"), "tiles", grid, CacheLogger::default())?;
//!
//!     let mut tile = Tile::at(0, 0, 4);
//!     if cache.load_tile(&mut tile)? {
//!         println!("{:?}", tile.source());
//!     }
//!     cache.cleanup()?;
//!     Ok(())
//! }
//! ```


use crate::{BatchQuery, ConnectionManager, GeoPackageConfig, TileMatrixEntry, TileTable, ZoomResolver, zoom::is_not_found};
use anyhow::{Context, Result};
use r2d2_sqlite::rusqlite::{Connection, OptionalExtension, params};
use std::{collections::HashMap, path::Path};
use tilecache_core::{CacheLogger, ImageSource, Tile, TileCache, TileGrid, TileTimestamp};

pub struct GeoPackageCache {
	connections: ConnectionManager,
	resolver: ZoomResolver,
	table: TileTable,
	tile_sql: String,
	log: CacheLogger,
}

impl GeoPackageCache {
	/// Creates a cache reading the tile table `table_name` of the GeoPackage at `path`.
	///
	/// The file is not opened until the first lookup.
	///
	/// # Errors
	/// Returns [`CacheError::InvalidTableName`](tilecache_core::CacheError::InvalidTableName)
	/// if `table_name` is not a plain SQL identifier.
	pub fn new(path: &Path, table_name: &str, grid: TileGrid, log: CacheLogger) -> Result<GeoPackageCache> {
		let table = TileTable::parse(table_name)?;
		log.debug(format_args!("new cache for {path:?}, table {table}"));

		Ok(GeoPackageCache {
			connections: ConnectionManager::new(path, log.child("connection")),
			resolver: ZoomResolver::new(table.clone(), grid, log.child("zoom")),
			tile_sql: format!("SELECT tile_data FROM {table} WHERE tile_column = ?1 AND tile_row = ?2 AND zoom_level = ?3"),
			table,
			log,
		})
	}

	/// Creates a cache from a parsed configuration.
	pub fn from_config(config: &GeoPackageConfig, log: CacheLogger) -> Result<GeoPackageCache> {
		let grid = config.grid.to_grid()?;
		GeoPackageCache::new(&config.filename, &config.table_name, grid, log)
	}

	#[must_use]
	pub fn connections(&self) -> &ConnectionManager {
		&self.connections
	}

	#[must_use]
	pub fn grid(&self) -> &TileGrid {
		self.resolver.grid()
	}

	/// Lists the stored zoom levels of the tile table with their resolutions.
	pub fn tile_matrix(&self) -> Result<Vec<TileMatrixEntry>> {
		let handle = self.connections.acquire()?;
		let conn = handle.lock();
		self.resolver.tile_matrix(&conn)
	}

	/// Stored zoom level for caller `level`, or `None` if the container has no comparable level.
	fn resolve_zoom(&self, conn: &Connection, level: u8) -> Result<Option<i64>> {
		match self.resolver.resolve_level(conn, level) {
			Ok(zoom) => Ok(Some(zoom)),
			Err(err) if is_not_found(&err) => Ok(None),
			Err(err) => Err(err),
		}
	}
}

impl TileCache for GeoPackageCache {
	fn load_tile(&self, tile: &mut Tile) -> Result<bool> {
		if tile.is_resolved() {
			return Ok(true);
		}
		let Some(&coord) = tile.coord() else {
			return Ok(true);
		};

		let handle = self.connections.acquire()?;
		let conn = handle.lock();

		let Some(zoom) = self.resolve_zoom(&conn, coord.level)? else {
			return Ok(false);
		};

		let data: Option<Vec<u8>> = conn
			.query_row(&self.tile_sql, params![coord.x, coord.y, zoom], |row| row.get(0))
			.optional()
			.with_context(|| format!("fetching tile {coord:?} at zoom level {zoom} from {}", self.table))?;

		match data {
			Some(data) => {
				self.log.trace(format_args!("loaded {coord} from zoom level {zoom}, {} bytes", data.len()));
				tile.set_source(ImageSource::from(data));
				Ok(true)
			}
			None => Ok(false),
		}
	}

	fn load_tiles(&self, tiles: &mut [Tile]) -> Result<bool> {
		let mut level = None;
		let mut pending = 0;
		let mut coords: Vec<(i64, i64)> = Vec::new();
		let mut lookup: HashMap<(i64, i64), usize> = HashMap::new();

		for (index, tile) in tiles.iter().enumerate() {
			let Some(coord) = tile.coord() else {
				continue;
			};
			if tile.is_resolved() {
				continue;
			}
			level.get_or_insert(coord.level);
			pending += 1;
			if lookup.insert(coord.column_row(), index).is_none() {
				coords.push(coord.column_row());
			}
		}

		let Some(level) = level else {
			return Ok(true);
		};

		BatchQuery::check_capacity(pending)?;

		let handle = self.connections.acquire()?;
		let conn = handle.lock();

		let Some(zoom) = self.resolve_zoom(&conn, level)? else {
			return Ok(false);
		};

		let query = BatchQuery::new(&self.table, &coords, zoom)?;
		self.log.debug(format_args!(
			"batch of {} tiles ({} distinct) at level {level}, zoom level {zoom}",
			pending,
			coords.len()
		));
		self.log.trace(format_args!("SQL: {}", query.sql()));

		let mut loaded = 0;
		query
			.for_each_row(&conn, |column, row, data| {
				if let Some(&index) = lookup.get(&(column, row)) {
					tiles[index].set_source(ImageSource::from(data));
					loaded += 1;
				}
			})
			.with_context(|| format!("fetching {} tiles at zoom level {zoom} from {}", coords.len(), self.table))?;

		Ok(loaded == lookup.len())
	}

	fn load_tile_metadata(&self, tile: &mut Tile) -> Result<()> {
		tile.set_timestamp(TileTimestamp::Untracked);
		Ok(())
	}

	fn cleanup(&self) -> Result<()> {
		self.connections.release()
	}
}

impl std::fmt::Debug for GeoPackageCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GeoPackageCache")
			.field("path", &self.connections.path())
			.field("table", &self.table.as_str())
			.finish()
	}
}
