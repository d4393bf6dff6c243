mod image_source;
mod tile;
mod tile_coord;
mod tile_grid;

pub use image_source::*;
pub use tile::*;
pub use tile_coord::*;
pub use tile_grid::*;
