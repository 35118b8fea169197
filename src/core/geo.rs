use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const MAX_LATITUDE: f64 = 85.0511287798;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to the Web Mercator projectable range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn floor(&self) -> Point {
        Point::new(self.x.floor(), self.y.floor())
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Represents a tile coordinate in the slippy map tile system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Creates a tile coordinate from a LatLng and zoom level
    pub fn from_lat_lng(lat_lng: &LatLng, zoom: u8) -> Self {
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();
        let n = 2_f64.powi(zoom as i32);

        let x = ((lat_lng.lng + 180.0) / 360.0 * n).floor() as u32;
        let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor() as u32;

        Self::new(x, y, zoom)
    }

    /// Converts tile coordinate to LatLng (northwest corner).
    ///
    /// The latitude comes from the inverse Mercator relation with the
    /// hyperbolic sine written out as `0.5 * (e^n - e^-n)`, which stays
    /// well-conditioned at the grid edges where `n` approaches ±π.
    pub fn to_lat_lng(&self) -> LatLng {
        let scale = 2_f64.powi(self.z as i32);
        let lng = self.x as f64 / scale * 360.0 - 180.0;
        let n = PI - 2.0 * PI * self.y as f64 / scale;
        let lat = (0.5 * (n.exp() - (-n).exp())).atan().to_degrees();

        LatLng::new(lat, lng)
    }

    /// Gets the parent tile at a lower zoom level
    pub fn parent(&self) -> Option<TileCoord> {
        if self.z == 0 {
            None
        } else {
            Some(TileCoord::new(self.x / 2, self.y / 2, self.z - 1))
        }
    }

    /// Gets the ancestor tile `delta` zoom levels up, if one exists
    pub fn ancestor(&self, delta: u8) -> Option<TileCoord> {
        if delta > self.z {
            None
        } else {
            Some(TileCoord::new(
                self.x >> delta,
                self.y >> delta,
                self.z - delta,
            ))
        }
    }

    /// Checks if the tile is valid for its zoom level
    pub fn is_valid(&self) -> bool {
        let max_coord = 2_u32.pow(self.z as u32);
        self.x < max_coord && self.y < max_coord
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(40.7128, -74.0060);
        assert_eq!(coord.lat, 40.7128);
        assert_eq!(coord.lng, -74.0060);
        assert!(coord.is_valid());
    }

    #[test]
    fn test_tile_coord_round_trip() {
        let lat_lng = LatLng::new(40.7128, -74.0060);
        let tile = TileCoord::from_lat_lng(&lat_lng, 10);
        let back = tile.to_lat_lng();

        // Should be reasonably close (within tile boundaries)
        assert!((back.lat - lat_lng.lat).abs() < 1.0);
        assert!((back.lng - lat_lng.lng).abs() < 1.0);
    }

    #[test]
    fn test_grid_origin_is_lon_minus_180_at_every_zoom() {
        for z in 0..=18 {
            let nw = TileCoord::new(0, 0, z).to_lat_lng();
            assert_eq!(nw.lng, -180.0, "x=0 at z={} must sit on the antimeridian", z);
        }
    }

    #[test]
    fn test_root_tile_corner() {
        let nw = TileCoord::new(0, 0, 0).to_lat_lng();
        assert_eq!(nw.lng, -180.0);
        assert!((nw.lat - MAX_LATITUDE).abs() < 1e-6);
    }

    #[test]
    fn test_ancestor_halving() {
        let tile = TileCoord::new(26, 11, 5);
        assert_eq!(tile.parent(), Some(TileCoord::new(13, 5, 4)));
        assert_eq!(tile.ancestor(2), Some(TileCoord::new(6, 2, 3)));
        assert_eq!(tile.ancestor(5), Some(TileCoord::new(0, 0, 0)));
        assert_eq!(tile.ancestor(6), None);
    }
}
