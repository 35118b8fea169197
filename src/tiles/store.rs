//! Tile records and the store the compositor queries.
//!
//! The store owns every `TileRecord` and is the only mutator of its
//! fields. The compositor reads records through shared references and
//! requests the two documented mutations (`register_fade_duration`,
//! `mark_fade_complete`) through the trait, so the single-writer rule
//! for per-tile fade state stays visible in the interface.

use crate::core::tile_id::OverscaledTileId;
use fxhash::FxHashMap;
use std::time::{Duration, Instant};

/// Opaque handle to a decoded tile image already resident on the GPU.
/// Texture upload and eviction belong to the rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// The renderable unit: a loaded tile image plus its fade bookkeeping.
///
/// A record exists only once its imagery is decoded and bound, so
/// `texture` is never absent. `time_added` marks when the image became
/// available and drives the crossfade; `refreshed_upon_expiration`
/// marks images swapped in by cache expiry rather than a fresh load,
/// which must not re-run the crossfade.
#[derive(Debug, Clone)]
pub struct TileRecord {
    pub id: OverscaledTileId,
    pub texture: TextureHandle,
    pub time_added: Instant,
    pub refreshed_upon_expiration: bool,
    pub fade_duration: Duration,
}

impl TileRecord {
    pub fn new(id: OverscaledTileId, texture: TextureHandle, time_added: Instant) -> Self {
        Self {
            id,
            texture,
            time_added,
            refreshed_upon_expiration: false,
            fade_duration: Duration::ZERO,
        }
    }

    /// Replaces the image after a cache-expiry refresh. The refresh flag
    /// suppresses the crossfade for this record until the fade window
    /// has fully elapsed once.
    pub fn mark_refreshed(&mut self, texture: TextureHandle, time_added: Instant) {
        self.texture = texture;
        self.time_added = time_added;
        self.refreshed_upon_expiration = true;
    }
}

/// Query surface of the tile cache/source, as seen by the compositor.
///
/// `find_loaded_ancestor` performs the quad-tree search itself; the
/// compositor only consumes the nearest candidate it returns. An
/// ancestor, when present, always has a strictly lower overscaled zoom
/// than the tile it backs.
pub trait TileStore {
    fn get_tile(&self, id: &OverscaledTileId) -> Option<&TileRecord>;

    /// Nearest loaded ancestor at least `min_zoom_delta` levels above
    /// `id`, on the same world copy.
    fn find_loaded_ancestor(
        &self,
        id: &OverscaledTileId,
        min_zoom_delta: u8,
    ) -> Option<&TileRecord>;

    /// Native tile size of the source, in pixels.
    fn tile_size(&self) -> u32;

    /// Whether the covering zoom level rounds instead of flooring.
    fn round_zoom(&self) -> bool;

    /// Records the layer's configured fade duration on the tile for the
    /// current frame.
    fn register_fade_duration(&mut self, id: &OverscaledTileId, duration: Duration);

    /// The one flag transition the compositor may request: once a
    /// refreshed tile's fade window has fully elapsed, the
    /// refreshed-upon-expiration flag is cleared so future zoom changes
    /// crossfade normally.
    fn mark_fade_complete(&mut self, id: &OverscaledTileId);
}

/// In-memory reference store backing the compositor in tests and in
/// embedders that manage tile loading themselves.
#[derive(Debug)]
pub struct MemoryTileStore {
    tiles: FxHashMap<OverscaledTileId, TileRecord>,
    tile_size: u32,
    round_zoom: bool,
}

impl MemoryTileStore {
    pub fn new(tile_size: u32, round_zoom: bool) -> Self {
        Self {
            tiles: FxHashMap::default(),
            tile_size,
            round_zoom,
        }
    }

    pub fn insert(&mut self, record: TileRecord) {
        self.tiles.insert(record.id, record);
    }

    pub fn remove(&mut self, id: &OverscaledTileId) -> Option<TileRecord> {
        self.tiles.remove(id)
    }

    pub fn get_mut(&mut self, id: &OverscaledTileId) -> Option<&mut TileRecord> {
        self.tiles.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl TileStore for MemoryTileStore {
    fn get_tile(&self, id: &OverscaledTileId) -> Option<&TileRecord> {
        self.tiles.get(id)
    }

    fn find_loaded_ancestor(
        &self,
        id: &OverscaledTileId,
        min_zoom_delta: u8,
    ) -> Option<&TileRecord> {
        let start = min_zoom_delta.max(1);
        for delta in start..=id.canonical.z {
            let coord = id.canonical.ancestor(delta)?;
            let candidate = OverscaledTileId::new(coord.z, id.wrap, coord);
            if let Some(record) = self.tiles.get(&candidate) {
                return Some(record);
            }
        }
        None
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn round_zoom(&self) -> bool {
        self.round_zoom
    }

    fn register_fade_duration(&mut self, id: &OverscaledTileId, duration: Duration) {
        if let Some(record) = self.tiles.get_mut(id) {
            record.fade_duration = duration;
        }
    }

    fn mark_fade_complete(&mut self, id: &OverscaledTileId) {
        if let Some(record) = self.tiles.get_mut(id) {
            if record.refreshed_upon_expiration {
                log::trace!("fade complete for {}, clearing refresh flag", id);
                record.refreshed_upon_expiration = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::TileCoord;

    fn record(x: u32, y: u32, z: u8) -> TileRecord {
        TileRecord::new(
            OverscaledTileId::from_coord(TileCoord::new(x, y, z)),
            TextureHandle(u64::from(x) << 16 | u64::from(y) << 8 | u64::from(z)),
            Instant::now(),
        )
    }

    #[test]
    fn test_ancestor_lookup_finds_nearest() {
        let mut store = MemoryTileStore::new(256, false);
        store.insert(record(0, 0, 0));
        store.insert(record(3, 2, 3));

        let child = OverscaledTileId::from_coord(TileCoord::new(13, 11, 5));
        let ancestor = store.find_loaded_ancestor(&child, 0).unwrap();
        assert_eq!(ancestor.id.canonical, TileCoord::new(3, 2, 3));
        assert!(ancestor.id.overscaled_z < child.overscaled_z);
    }

    #[test]
    fn test_ancestor_lookup_honors_min_delta() {
        let mut store = MemoryTileStore::new(256, false);
        store.insert(record(6, 5, 4));
        store.insert(record(1, 1, 2));

        let child = OverscaledTileId::from_coord(TileCoord::new(13, 11, 5));
        let near = store.find_loaded_ancestor(&child, 0).unwrap();
        assert_eq!(near.id.canonical.z, 4);

        let far = store.find_loaded_ancestor(&child, 2).unwrap();
        assert_eq!(far.id.canonical.z, 2);
    }

    #[test]
    fn test_ancestor_lookup_never_returns_self() {
        let mut store = MemoryTileStore::new(256, false);
        store.insert(record(13, 11, 5));

        let child = OverscaledTileId::from_coord(TileCoord::new(13, 11, 5));
        assert!(store.find_loaded_ancestor(&child, 0).is_none());
    }

    #[test]
    fn test_ancestor_lookup_respects_wrap() {
        let mut store = MemoryTileStore::new(256, false);
        store.insert(record(0, 0, 0));

        let wrapped = OverscaledTileId::new(5, 1, TileCoord::new(13, 11, 5));
        // Root tile was inserted on wrap 0, not wrap 1.
        assert!(store.find_loaded_ancestor(&wrapped, 0).is_none());
    }

    #[test]
    fn test_mark_fade_complete_clears_refresh_flag() {
        let mut store = MemoryTileStore::new(256, false);
        let mut r = record(1, 1, 1);
        r.refreshed_upon_expiration = true;
        let id = r.id;
        store.insert(r);

        store.mark_fade_complete(&id);
        assert!(!store.get_tile(&id).unwrap().refreshed_upon_expiration);
    }
}
