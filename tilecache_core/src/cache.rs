use crate::Tile;
use anyhow::Result;

/// Read access to a tile cache backend.
///
/// All methods are blocking. A tile that is already resolved (no coordinate, or a payload
/// is present) is answered without touching the backend's storage. A tile that is not
/// stored is a miss (`Ok(false)`), not an error; errors are reserved for structural
/// problems such as an unopenable file or an oversized batch.
pub trait TileCache: Send + Sync {
	/// Returns true if `tile` is resolved or present in the cache. May load the payload.
	fn is_cached(&self, tile: &mut Tile) -> Result<bool> {
		if tile.is_resolved() {
			return Ok(true);
		}
		self.load_tile(tile)
	}

	/// Load the payload of a single tile. Returns false on a miss.
	fn load_tile(&self, tile: &mut Tile) -> Result<bool>;

	/// Load the payloads of several tiles of the same level.
	/// Returns true if every tile that lacked a payload was found.
	fn load_tiles(&self, tiles: &mut [Tile]) -> Result<bool>;

	/// Fill in the tile's modification timestamp.
	fn load_tile_metadata(&self, tile: &mut Tile) -> Result<()>;

	/// Release resources held for the calling thread.
	fn cleanup(&self) -> Result<()>;
}
