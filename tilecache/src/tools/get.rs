use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tilecache_core::{Tile, TileCache, TileCoord};

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// YAML configuration of the GeoPackage cache
	#[arg()]
	config: PathBuf,

	/// level in the configured grid
	#[arg()]
	level: u8,

	/// tile column
	#[arg(allow_hyphen_values = true)]
	x: i64,

	/// tile row
	#[arg(allow_hyphen_values = true)]
	y: i64,

	/// write the tile image to this file
	#[arg(long, short, value_name = "FILE")]
	output: Option<PathBuf>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let cache = super::open_cache(&arguments.config)?;
	let coord = TileCoord::new(arguments.level, arguments.x, arguments.y);
	let mut tile = Tile::new(Some(coord));

	let found = cache.load_tile(&mut tile);
	cache.cleanup()?;
	if !found? {
		bail!("tile {coord} not found");
	}

	let Some(source) = tile.take_source() else {
		bail!("tile {coord} has no payload");
	};
	let format = source.format().map_or("unknown format", |f| f.as_str());
	println!("{coord}: {} bytes, {format}", source.len());

	if let Some(output) = &arguments.output {
		std::fs::write(output, source.as_slice()).with_context(|| format!("writing {output:?}"))?;
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;

	#[test]
	fn rejects_non_numeric_coordinates() {
		let err = run_command(vec!["tilecache", "get", "cache.yml", "4", "a", "0"]).unwrap_err();
		assert!(err.to_string().contains("invalid value 'a'"));
	}
}
