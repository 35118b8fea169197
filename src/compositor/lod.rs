//! Per-tile level-of-detail resolution.
//!
//! The tile's own record is always the primary sampler once loaded; the
//! nearest loaded ancestor is looked up regardless, because the fade
//! blends it in as a secondary sampler rather than substituting it for
//! the child. The quad-tree search itself lives in the tile store; this
//! module only consumes the candidate it returns.

use crate::core::tile_id::OverscaledTileId;
use crate::tiles::{TileRecord, TileStore};
use crate::{CompositeError, Result};

/// Sub-rectangle of the ancestor texture that corresponds to the
/// child's footprint: sample at `uv * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AncestorRemap {
    pub scale: f64,
    pub offset: (f64, f64),
}

impl AncestorRemap {
    pub const IDENTITY: AncestorRemap = AncestorRemap {
        scale: 1.0,
        offset: (0.0, 0.0),
    };

    /// Remap for a child sampled out of `ancestor`. The ancestor covers
    /// `1/scale` tiles of the child's zoom in each axis, so the child's
    /// corner lands at the fractional part of its scaled column/row.
    pub fn for_ancestor(child: &OverscaledTileId, ancestor: &OverscaledTileId) -> Self {
        let scale =
            2_f64.powi(ancestor.overscaled_z as i32 - child.overscaled_z as i32);
        AncestorRemap {
            scale,
            offset: (
                (child.canonical.x as f64 * scale).rem_euclid(1.0),
                (child.canonical.y as f64 * scale).rem_euclid(1.0),
            ),
        }
    }
}

/// Outcome of LOD resolution for one visible tile.
#[derive(Debug)]
pub struct ResolvedTile<'a> {
    pub tile: &'a TileRecord,
    pub ancestor: Option<&'a TileRecord>,
    pub remap: AncestorRemap,
    /// Draw ordering within the batch: zero for the coarsest zoom
    /// present, increasing toward finer tiles.
    pub order_key: u8,
}

/// Resolves the sample sources for `id`. The record must exist — the
/// visibility pass only hands over loaded tiles, so a miss is a store
/// contract violation surfaced as [`CompositeError::TileUnavailable`].
pub fn resolve_lod<'a, S: TileStore + ?Sized>(
    store: &'a S,
    id: &OverscaledTileId,
    min_overscaled_z: u8,
) -> Result<ResolvedTile<'a>> {
    let tile = store
        .get_tile(id)
        .ok_or(CompositeError::TileUnavailable(*id))?;

    let ancestor = store.find_loaded_ancestor(id, 0);
    debug_assert!(
        ancestor.map_or(true, |a| a.id.overscaled_z < id.overscaled_z),
        "ancestor fallback must have a strictly lower overscaled zoom"
    );

    let remap = match ancestor {
        Some(a) => AncestorRemap::for_ancestor(id, &a.id),
        None => AncestorRemap::IDENTITY,
    };

    Ok(ResolvedTile {
        tile,
        ancestor,
        remap,
        order_key: id.overscaled_z - min_overscaled_z,
    })
}
