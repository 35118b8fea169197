pub mod config;
pub mod geo;
pub mod tile_id;
