//! SQL building blocks for tile lookups.
//!
//! Table names cannot be bound as parameters, so [`TileTable`] only accepts plain SQL
//! identifiers before they are spliced into statement text. [`BatchQuery`] assembles the
//! disjunctive multi-tile lookup and checks the bound-parameter ceiling before any text
//! is produced.

use anyhow::{Context, Result};
use r2d2_sqlite::rusqlite::{Connection, params_from_iter};
use regex::Regex;
use std::{
	fmt::{self, Display},
	sync::LazyLock,
};
use tilecache_core::{CacheError, MAX_BOUND_PARAMETERS};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Bound values per tile in a lookup: column, row and zoom level.
const PARAMETERS_PER_TILE: usize = 3;

/// A validated tile table name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileTable(String);

impl TileTable {
	/// # Errors
	/// Returns [`CacheError::InvalidTableName`] unless `name` is a plain SQL identifier.
	pub fn parse(name: &str) -> Result<TileTable, CacheError> {
		if IDENTIFIER.is_match(name) {
			Ok(TileTable(name.to_string()))
		} else {
			Err(CacheError::InvalidTableName(name.to_string()))
		}
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for TileTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "\"{}\"", self.0)
	}
}

/// One statement that fetches several tiles of a single stored zoom level.
///
/// ```
/// use tilecache_geopackage::{BatchQuery, TileTable};
///
/// let table = TileTable::parse("tiles").unwrap();
/// let query = BatchQuery::new(&table, &[(0, 0), (0, 1)], 4).unwrap();
/// assert_eq!(query.params(), &[0, 0, 4, 0, 1, 4]);
/// assert!(query.sql().ends_with(
/// 	"(tile_column = ? AND tile_row = ? AND zoom_level = ?) OR (tile_column = ? AND tile_row = ? AND zoom_level = ?)"
/// ));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BatchQuery {
	sql: String,
	params: Vec<i64>,
}

impl BatchQuery {
	/// Checks that `tiles` lookups fit into one statement.
	///
	/// # Errors
	/// Returns [`CacheError::BatchLimit`] if more than [`MAX_BOUND_PARAMETERS`] values would be bound.
	pub fn check_capacity(tiles: usize) -> Result<(), CacheError> {
		if tiles.saturating_mul(PARAMETERS_PER_TILE) > MAX_BOUND_PARAMETERS {
			return Err(CacheError::BatchLimit { tiles });
		}
		Ok(())
	}

	/// Builds the lookup of all `(column, row)` pairs at stored zoom level `zoom`.
	///
	/// # Errors
	/// Returns [`CacheError::BatchLimit`] if `coords` does not fit into one statement.
	pub fn new(table: &TileTable, coords: &[(i64, i64)], zoom: i64) -> Result<BatchQuery, CacheError> {
		BatchQuery::check_capacity(coords.len())?;

		let condition = if coords.is_empty() {
			String::from("0")
		} else {
			vec!["(tile_column = ? AND tile_row = ? AND zoom_level = ?)"; coords.len()].join(" OR ")
		};
		let sql = format!("SELECT tile_column, tile_row, tile_data FROM {table} WHERE {condition}");
		let params = coords.iter().flat_map(|&(x, y)| [x, y, zoom]).collect();

		Ok(BatchQuery { sql, params })
	}

	#[must_use]
	pub fn sql(&self) -> &str {
		&self.sql
	}

	#[must_use]
	pub fn params(&self) -> &[i64] {
		&self.params
	}

	/// Runs the statement and calls `callback(column, row, data)` for every returned row.
	/// Returns the number of rows.
	pub fn for_each_row<F>(&self, conn: &Connection, mut callback: F) -> Result<usize>
	where
		F: FnMut(i64, i64, Vec<u8>),
	{
		let mut stmt = conn.prepare(&self.sql).context("preparing batch tile query")?;
		let mut rows = stmt.query(params_from_iter(self.params.iter()))?;

		let mut count = 0;
		while let Some(row) = rows.next()? {
			callback(row.get(0)?, row.get(1)?, row.get(2)?);
			count += 1;
		}
		Ok(count)
	}
}
