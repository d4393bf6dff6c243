use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::{Path, PathBuf},
};
use tilecache_core::GridConfig;

fn default_table_name() -> String {
	String::from("tiles")
}

/// Configuration of a GeoPackage tile cache.
///
/// ```yaml
/// filename: world.gpkg
/// table_name: tiles
/// grid:
///   resolutions: [800, 400, 200, 100]
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GeoPackageConfig {
	/// Path of the GeoPackage file. Relative paths are resolved against the config file.
	pub filename: PathBuf,

	/// Name of the tile pyramid table.
	#[serde(default = "default_table_name")]
	pub table_name: String,

	/// The caller's grid.
	#[serde(default)]
	pub grid: GridConfig,
}

impl GeoPackageConfig {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Ok(serde_yaml_ng::from_reader(reader)?)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		Ok(serde_yaml_ng::from_str(text)?)
	}

	/// Parse from a file path and resolve `filename` relative to that file.
	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("opening config {path:?}"))?;
		let mut config =
			GeoPackageConfig::from_reader(BufReader::new(file)).with_context(|| format!("parsing config {path:?}"))?;
		if let Some(base) = path.parent() {
			config.resolve_paths(base);
		}
		Ok(config)
	}

	pub fn resolve_paths(&mut self, base: &Path) {
		if self.filename.is_relative() {
			self.filename = base.join(&self.filename);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use tempfile::tempdir;

	#[test]
	fn parse_minimal_config() {
		let config = GeoPackageConfig::from_string("filename: /data/world.gpkg").unwrap();
		assert_eq!(
			config,
			GeoPackageConfig {
				filename: PathBuf::from("/data/world.gpkg"),
				table_name: String::from("tiles"),
				grid: GridConfig::default(),
			}
		);
	}

	#[test]
	fn parse_full_config() {
		let config = GeoPackageConfig::from_string(
			"filename: world.gpkg\ntable_name: world\ngrid:\n  resolutions: [800, 400]\n",
		)
		.unwrap();
		assert_eq!(config.table_name, "world");
		assert_eq!(config.grid.resolutions, Some(vec![800.0, 400.0]));
	}

	#[test]
	fn parse_invalid_config() {
		assert!(GeoPackageConfig::from_string("").is_err());
		assert!(GeoPackageConfig::from_string("filename: a.gpkg\nlock_dir: /tmp").is_err());
	}

	#[test]
	fn relative_filename_follows_config_file() -> Result<()> {
		let dir = tempdir()?;
		let path = dir.path().join("cache.yml");
		std::fs::write(&path, "filename: data/world.gpkg\n")?;

		let config = GeoPackageConfig::from_path(&path)?;
		assert_eq!(config.filename, dir.path().join("data/world.gpkg"));

		std::fs::write(&path, "filename: /abs/world.gpkg\n")?;
		let config = GeoPackageConfig::from_path(&path)?;
		assert_eq!(config.filename, PathBuf::from("/abs/world.gpkg"));
		Ok(())
	}
}
