pub mod store;

pub use store::{MemoryTileStore, TextureHandle, TileRecord, TileStore};
