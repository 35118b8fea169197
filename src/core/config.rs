//! Layer configuration consumed by the compositor.
//!
//! These options are owned by the style/layer system; the compositor
//! reads them once per frame and never mutates them.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Texture resampling filter for raster tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resampling {
    Nearest,
    Linear,
}

/// Geodetic reference system the tile imagery was authored in.
///
/// When the imagery grid is shifted relative to the primary WGS-84 grid
/// (GCJ-02 imagery drawn on a WGS-84 map), the compositor applies a
/// screen-space alignment offset per batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReferenceSystem {
    Wgs84,
    Gcj02,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterLayerOptions {
    pub opacity: f32,
    pub fade_duration_ms: u64,
    pub resampling: Resampling,
    pub reference_system: ReferenceSystem,
}

impl Default for RasterLayerOptions {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            fade_duration_ms: 300,
            resampling: Resampling::Linear,
            reference_system: ReferenceSystem::Wgs84,
        }
    }
}

impl RasterLayerOptions {
    /// Parses options from a style JSON fragment
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        if !(0.0..=1.0).contains(&options.opacity) {
            return Err(crate::CompositeError::InvalidConfig(format!(
                "opacity {} outside [0, 1]",
                options.opacity
            ))
            .into());
        }
        Ok(options)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    /// True when the layer imagery lives in a secondary reference system
    /// and needs the per-batch alignment offset.
    pub fn alignment_active(&self) -> bool {
        self.reference_system == ReferenceSystem::Gcj02
    }
}
