//! The caller's tile grid, reduced to what cache lookups need: a resolution per level.
//!
//! Containers number their zoom levels independently, so backends match levels by
//! physical resolution. [`TileGrid::resolution`] supplies the resolution for a caller
//! level and [`TileGrid::tolerance`] the half-width of the matching window.
//!
//! A grid is built from explicit resolutions or as a Web Mercator ladder:
//!
//! ```
//! use tilecache_core::TileGrid;
//!
//! let grid = TileGrid::web_mercator(8, 256);
//! assert_eq!(grid.num_levels(), 8);
//! assert_eq!(grid.resolution(1).unwrap(), 78271.51696402048);
//!
//! let grid = TileGrid::from_resolutions(vec![400.0, 200.0, 100.0]);
//! assert_eq!(grid.tolerance(2).unwrap(), 50.0);
//! ```

use crate::CacheError;
use anyhow::{Result, ensure};
use serde::Deserialize;

/// Earth circumference at the equator in Web Mercator meters.
const WEB_MERCATOR_EXTENT: f64 = 2.0 * 20_037_508.342_789_244;

/// Per-level resolutions of a tile grid, in map units per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
	resolutions: Vec<f64>,
}

impl TileGrid {
	#[must_use]
	pub fn from_resolutions(resolutions: Vec<f64>) -> TileGrid {
		TileGrid { resolutions }
	}

	/// A global Web Mercator grid with `num_levels` levels of `tile_size` pixel tiles.
	/// Each level halves the resolution of the previous one.
	#[must_use]
	pub fn web_mercator(num_levels: u8, tile_size: u32) -> TileGrid {
		let base = WEB_MERCATOR_EXTENT / f64::from(tile_size);
		let resolutions = (0..num_levels).map(|level| base / 2f64.powi(i32::from(level))).collect();
		TileGrid { resolutions }
	}

	#[must_use]
	pub fn num_levels(&self) -> usize {
		self.resolutions.len()
	}

	#[must_use]
	pub fn resolutions(&self) -> &[f64] {
		&self.resolutions
	}

	/// Resolution of `level`.
	///
	/// # Errors
	/// Returns [`CacheError::LevelOutOfRange`] if the grid has no such level.
	pub fn resolution(&self, level: u8) -> Result<f64> {
		match self.resolutions.get(usize::from(level)) {
			Some(resolution) => Ok(*resolution),
			None => Err(CacheError::LevelOutOfRange {
				level,
				levels: self.resolutions.len(),
			}
			.into()),
		}
	}

	/// Half-width of the window in which a stored resolution matches `level`.
	pub fn tolerance(&self, level: u8) -> Result<f64> {
		Ok(0.5 * self.resolution(level)?)
	}
}

/// Grid section of a cache configuration.
///
/// Explicit `resolutions` take precedence. Without them a Web Mercator grid is built
/// from `num_levels` (default 20) and `tile_size` (default 256).
#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
	/// Resolution of every grid level, finest last.
	pub resolutions: Option<Vec<f64>>,

	/// Number of levels of the Web Mercator grid.
	pub num_levels: Option<u8>,

	/// Tile edge length in pixels of the Web Mercator grid.
	pub tile_size: Option<u32>,
}

impl GridConfig {
	/// Build the configured grid.
	///
	/// # Errors
	/// Returns an error if explicit resolutions are empty, not positive, or if the tile size is zero.
	pub fn to_grid(&self) -> Result<TileGrid> {
		if let Some(resolutions) = &self.resolutions {
			ensure!(!resolutions.is_empty(), "grid resolutions must not be empty");
			ensure!(
				resolutions.iter().all(|r| r.is_finite() && *r > 0.0),
				"grid resolutions must be positive, got {resolutions:?}"
			);
			return Ok(TileGrid::from_resolutions(resolutions.clone()));
		}

		let tile_size = self.tile_size.unwrap_or(256);
		ensure!(tile_size > 0, "tile_size must be positive");
		Ok(TileGrid::web_mercator(self.num_levels.unwrap_or(20), tile_size))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn web_mercator_ladder() {
		let grid = TileGrid::web_mercator(4, 256);
		assert_eq!(
			grid.resolutions(),
			&[156543.03392804097, 78271.51696402048, 39135.75848201024, 19567.87924100512]
		);

		let grid = TileGrid::web_mercator(1, 512);
		assert_eq!(grid.resolutions(), &[78271.51696402048]);
	}

	#[test]
	fn level_out_of_range() {
		let grid = TileGrid::from_resolutions(vec![10.0, 5.0]);
		assert_eq!(grid.resolution(1).unwrap(), 5.0);
		assert_eq!(grid.tolerance(0).unwrap(), 5.0);

		let err = grid.resolution(2).unwrap_err();
		assert_eq!(
			err.downcast_ref::<CacheError>(),
			Some(&CacheError::LevelOutOfRange { level: 2, levels: 2 })
		);
	}

	#[test]
	fn config_from_yaml() {
		let config: GridConfig = serde_yaml_ng::from_str("resolutions: [800, 400, 200.5]").unwrap();
		assert_eq!(
			config.to_grid().unwrap(),
			TileGrid::from_resolutions(vec![800.0, 400.0, 200.5])
		);

		let config: GridConfig = serde_yaml_ng::from_str("num_levels: 3\ntile_size: 512").unwrap();
		assert_eq!(config.to_grid().unwrap(), TileGrid::web_mercator(3, 512));

		let config = GridConfig::default();
		assert_eq!(config.to_grid().unwrap().num_levels(), 20);
	}

	#[test]
	fn config_rejects_bad_values() {
		let config: GridConfig = serde_yaml_ng::from_str("resolutions: []").unwrap();
		assert!(config.to_grid().is_err());

		let config: GridConfig = serde_yaml_ng::from_str("resolutions: [10, -1]").unwrap();
		assert!(config.to_grid().is_err());

		assert!(serde_yaml_ng::from_str::<GridConfig>("levels: 3").is_err());
	}
}
