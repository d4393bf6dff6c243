pub mod get;
pub mod probe;

use anyhow::Result;
use std::path::Path;
use tilecache_core::CacheLogger;
use tilecache_geopackage::{GeoPackageCache, GeoPackageConfig};

/// Opens the cache described by the YAML config at `path`.
fn open_cache(path: &Path) -> Result<GeoPackageCache> {
	let config = GeoPackageConfig::from_path(path)?;
	GeoPackageCache::from_config(&config, CacheLogger::new("tilecache::geopackage"))
}
