//! Geodetic reference-system conversion.
//!
//! The alignment offset needs one conversion between two named
//! reference systems. The conversion itself is an empirical correction
//! independent of the compositing logic, so it sits behind the
//! [`Reprojector`] trait and the compositor never sees its constants.

use std::f64::consts::PI;

/// Converts a longitude/latitude pair between two named geodetic
/// reference systems. Implementations must be pure and deterministic.
pub trait Reprojector {
    fn reproject(&self, lng: f64, lat: f64) -> (f64, f64);
}

const KRASOVSKY_A: f64 = 6378245.0;
const KRASOVSKY_EE: f64 = 0.006_693_421_622_965_943;

/// Empirical WGS-84 → GCJ-02 correction (Krasovsky 1940 ellipsoid).
///
/// GCJ-02 is the obfuscated datum Chinese map imagery is authored in;
/// the polynomial below is the widely reverse-engineered forward
/// transform. Coordinates outside mainland China pass through
/// unchanged, matching the published behavior.
#[derive(Debug, Default, Clone, Copy)]
pub struct Wgs84ToGcj02;

impl Wgs84ToGcj02 {
    pub fn new() -> Self {
        Self
    }

    fn out_of_china(lng: f64, lat: f64) -> bool {
        !(72.004..=137.8347).contains(&lng) || !(0.8293..=55.8271).contains(&lat)
    }

    fn transform_lat(x: f64, y: f64) -> f64 {
        let mut ret = -100.0 + 2.0 * x + 3.0 * y + 0.2 * y * y
            + 0.1 * x * y
            + 0.2 * x.abs().sqrt();
        ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
        ret += (20.0 * (y * PI).sin() + 40.0 * (y / 3.0 * PI).sin()) * 2.0 / 3.0;
        ret += (160.0 * (y / 12.0 * PI).sin() + 320.0 * (y * PI / 30.0).sin()) * 2.0 / 3.0;
        ret
    }

    fn transform_lng(x: f64, y: f64) -> f64 {
        let mut ret = 300.0 + x + 2.0 * y + 0.1 * x * x
            + 0.1 * x * y
            + 0.1 * x.abs().sqrt();
        ret += (20.0 * (6.0 * x * PI).sin() + 20.0 * (2.0 * x * PI).sin()) * 2.0 / 3.0;
        ret += (20.0 * (x * PI).sin() + 40.0 * (x / 3.0 * PI).sin()) * 2.0 / 3.0;
        ret += (150.0 * (x / 12.0 * PI).sin() + 300.0 * (x / 30.0 * PI).sin()) * 2.0 / 3.0;
        ret
    }
}

impl Reprojector for Wgs84ToGcj02 {
    fn reproject(&self, lng: f64, lat: f64) -> (f64, f64) {
        if Self::out_of_china(lng, lat) {
            return (lng, lat);
        }

        let d_lat = Self::transform_lat(lng - 105.0, lat - 35.0);
        let d_lng = Self::transform_lng(lng - 105.0, lat - 35.0);
        let rad_lat = lat / 180.0 * PI;
        let mut magic = rad_lat.sin();
        magic = 1.0 - KRASOVSKY_EE * magic * magic;
        let sqrt_magic = magic.sqrt();
        let d_lat =
            (d_lat * 180.0) / ((KRASOVSKY_A * (1.0 - KRASOVSKY_EE)) / (magic * sqrt_magic) * PI);
        let d_lng = (d_lng * 180.0) / (KRASOVSKY_A / sqrt_magic * rad_lat.cos() * PI);

        (lng + d_lng, lat + d_lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_china_passthrough() {
        let reprojector = Wgs84ToGcj02::new();
        let (lng, lat) = reprojector.reproject(-122.4194, 37.7749);
        assert_eq!(lng, -122.4194);
        assert_eq!(lat, 37.7749);
    }

    #[test]
    fn test_known_point_beijing() {
        // Reference value from the coordtransform test suite.
        let reprojector = Wgs84ToGcj02::new();
        let (lng, lat) = reprojector.reproject(116.404, 39.915);
        assert!((lng - 116.41024).abs() < 1e-3, "lng {}", lng);
        assert!((lat - 39.91640).abs() < 1e-3, "lat {}", lat);
    }

    #[test]
    fn test_offset_magnitude_is_sub_kilometer() {
        // The GCJ-02 shift is a few hundred meters anywhere in China.
        let reprojector = Wgs84ToGcj02::new();
        for &(lng, lat) in &[(104.06, 30.67), (121.47, 31.23), (113.26, 23.13)] {
            let (glng, glat) = reprojector.reproject(lng, lat);
            assert!((glng - lng).abs() < 0.01);
            assert!((glat - lat).abs() < 0.01);
            assert!((glng, glat) != (lng, lat));
        }
    }

    #[test]
    fn test_deterministic() {
        let reprojector = Wgs84ToGcj02::new();
        assert_eq!(
            reprojector.reproject(116.404, 39.915),
            reprojector.reproject(116.404, 39.915)
        );
    }
}
