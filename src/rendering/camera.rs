//! The frame's view of the world.
//!
//! `ViewCamera` is handed to the compositor explicitly each frame
//! instead of living in ambient renderer state, so the compositing pass
//! can run against a synthetic camera in tests.

use crate::core::geo::{LatLng, Point};
use crate::core::tile_id::OverscaledTileId;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Projects a geographic point into the current view's screen-space
/// pixel coordinates.
pub trait PointProjector {
    fn project(&self, lat_lng: &LatLng) -> Point;
}

/// Current camera: center, fractional zoom, viewport size in pixels and
/// the renderer's base tile size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewCamera {
    pub center: LatLng,
    pub zoom: f64,
    pub size: Point,
    pub tile_size: u32,
}

impl ViewCamera {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom,
            size,
            tile_size: 512,
        }
    }

    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// World pixel coordinates of a geographic point at the given zoom
    fn project_world(&self, lat_lng: &LatLng, zoom: f64) -> Point {
        let scale = self.tile_size as f64 * 2_f64.powf(zoom);
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();
        let x = (lat_lng.lng + 180.0) / 360.0 * scale;
        let y = (1.0 - ((lat_rad.tan() + 1.0 / lat_rad.cos()).ln()) / PI) / 2.0 * scale;
        Point::new(x, y)
    }

    /// The integer zoom whose tiles best cover the current view for a
    /// source with the given native tile size.
    pub fn covering_zoom_level(&self, source_tile_size: u32, round_zoom: bool) -> u8 {
        let z = self.zoom + (self.tile_size as f64 / source_tile_size as f64).log2();
        let z = if round_zoom { z.round() } else { z.floor() };
        z.max(0.0) as u8
    }

    /// Screen transform for one tile as a 2D affine matrix
    /// `[sx, 0, 0, sy, tx, ty]`, mapping tile-local pixels
    /// `0..source_tile_size` onto the viewport. `align` snaps the
    /// translation to whole pixels, used when the camera is at rest.
    pub fn tile_matrix(
        &self,
        id: &OverscaledTileId,
        source_tile_size: u32,
        align: bool,
    ) -> [f64; 6] {
        let ts = source_tile_size as f64;
        let world_tiles = 2_f64.powi(id.canonical.z as i32);
        let zoom_scale = 2_f64.powf(self.zoom - id.canonical.z as f64)
            * self.tile_size as f64
            / source_tile_size as f64;

        let tile_origin_x = (id.canonical.x as f64 + id.wrap as f64 * world_tiles) * ts;
        let tile_origin_y = id.canonical.y as f64 * ts;

        let center_world = {
            let scale = ts * world_tiles;
            let lat_rad = LatLng::clamp_lat(self.center.lat).to_radians();
            Point::new(
                (self.center.lng + 180.0) / 360.0 * scale,
                (1.0 - ((lat_rad.tan() + 1.0 / lat_rad.cos()).ln()) / PI) / 2.0 * scale,
            )
        };

        let mut tx = (tile_origin_x - center_world.x) * zoom_scale + self.size.x / 2.0;
        let mut ty = (tile_origin_y - center_world.y) * zoom_scale + self.size.y / 2.0;
        if align {
            tx = tx.round();
            ty = ty.round();
        }

        [zoom_scale, 0.0, 0.0, zoom_scale, tx, ty]
    }
}

impl PointProjector for ViewCamera {
    /// Screen pixel coordinates of a geographic point under the current
    /// camera, origin at the top-left of the viewport.
    fn project(&self, lat_lng: &LatLng) -> Point {
        let world = self.project_world(lat_lng, self.zoom);
        let center = self.project_world(&self.center, self.zoom);
        Point::new(
            world.x - center.x + self.size.x / 2.0,
            world.y - center.y + self.size.y / 2.0,
        )
    }
}

/// Fold a pixel translation into an existing tile matrix.
pub fn translate_matrix(matrix: [f64; 6], dx: f64, dy: f64) -> [f64; 6] {
    let mut out = matrix;
    out[4] += dx;
    out[5] += dy;
    out
}
