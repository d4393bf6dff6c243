use anyhow::Result;
use std::path::PathBuf;
use tilecache_core::TileCache;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// YAML configuration of the GeoPackage cache
	#[arg(required = true)]
	config: PathBuf,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let cache = super::open_cache(&arguments.config)?;
	eprintln!("probe {:?}", cache.connections().path());

	let entries = cache.tile_matrix()?;
	println!("zoom_level\tpixel_size");
	for entry in &entries {
		println!("{}\t{}", entry.zoom_level, entry.resolution);
	}

	let grid = cache.grid();
	println!("grid levels: {}", grid.num_levels());

	cache.cleanup()
}

#[cfg(test)]
mod tests {
	use crate::tests::run_command;

	#[test]
	fn missing_config() {
		let err = run_command(vec!["tilecache", "probe", "/does/not/exist.yml"]).unwrap_err();
		assert!(err.to_string().starts_with("opening config"));
	}
}
