//! Screen-space alignment offset between two geodetic reference systems.
//!
//! Imagery authored in a shifted datum (GCJ-02) lands a few hundred
//! meters away from where the WGS-84 tile grid puts it. Projecting one
//! geographic point under both datums and differencing the screen
//! positions yields the pixel shift that re-aligns the batch.

use crate::core::tile_id::OverscaledTileId;
use crate::geodetic::Reprojector;
use crate::rendering::camera::PointProjector;
use crate::LatLng;

/// 2D pixel-space translation, truncated toward zero. Valid for one
/// render batch under one alignment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OffsetVector {
    pub x: i32,
    pub y: i32,
}

impl OffsetVector {
    pub const ZERO: OffsetVector = OffsetVector { x: 0, y: 0 };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Computes the alignment offset for a batch from its first tile.
///
/// The offset is treated as locally constant over the small geographic
/// extent of one batch, so it is derived from a single tile and reused;
/// callers skip this entirely (zero offset, no reprojection) when the
/// batch is empty or alignment is inactive.
pub fn alignment_offset(
    first: &OverscaledTileId,
    reprojector: &dyn Reprojector,
    projector: &dyn PointProjector,
) -> OffsetVector {
    let coord = first.canonical;
    let lat_lng = coord.to_lat_lng();
    let (shifted_lng, shifted_lat) = reprojector.reproject(lat_lng.lng, lat_lng.lat);

    let source_point = projector.project(&lat_lng);
    let shifted_point = projector.project(&LatLng::new(shifted_lat, shifted_lng));

    let offset = OffsetVector {
        x: (source_point.x - shifted_point.x) as i32,
        y: (source_point.y - shifted_point.y) as i32,
    };
    log::trace!("alignment offset for {}: ({}, {})", first, offset.x, offset.y);
    offset
}
