//! Tile addressing for overscaled rendering.
//!
//! A tile can be rendered at a zoom above its native data zoom when a
//! lower-resolution tile is stretched to fill a higher-zoom slot, so the
//! render-time identity carries both zooms plus a longitude wrap index.

use crate::core::geo::TileCoord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a tile as the renderer sees it: the canonical grid
/// address, the zoom level it is rendered at, and the world copy it
/// belongs to for longitude wrap-around. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverscaledTileId {
    pub overscaled_z: u8,
    pub wrap: i32,
    pub canonical: TileCoord,
}

impl OverscaledTileId {
    /// Creates a tile id. `overscaled_z` must be at least the canonical
    /// zoom; an overscaled zoom below the data zoom has no meaning.
    pub fn new(overscaled_z: u8, wrap: i32, canonical: TileCoord) -> Self {
        debug_assert!(
            overscaled_z >= canonical.z,
            "overscaled zoom {} below canonical zoom {}",
            overscaled_z,
            canonical.z
        );
        Self {
            overscaled_z,
            wrap,
            canonical,
        }
    }

    /// Tile rendered at its native zoom on the primary world copy.
    pub fn from_coord(coord: TileCoord) -> Self {
        Self::new(coord.z, 0, coord)
    }

    /// True when the tile is stretched beyond its native data zoom.
    pub fn is_overscaled(&self) -> bool {
        self.overscaled_z > self.canonical.z
    }
}

impl fmt::Display for OverscaledTileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}@{}w{}",
            self.canonical.z, self.canonical.x, self.canonical.y, self.overscaled_z, self.wrap
        )
    }
}
