//! # tilemix
//!
//! The raster-tile compositing core of a tiled map renderer.
//!
//! Given the set of visible tiles for a frame (possibly at mixed zoom
//! levels), this crate picks the best available image per tile (keeping
//! the nearest loaded ancestor bound as a secondary sampler while a
//! tile's own imagery is still fading in), computes a wall-clock-driven
//! crossfade between the two, optionally derives a pixel-space alignment
//! offset between two geodetic reference systems, and emits one
//! backend-agnostic draw invocation per tile.
//!
//! Everything around it — tile fetching and decoding, texture upload,
//! visibility determination, GPU submission — lives behind traits
//! ([`tiles::TileStore`], [`rendering::RenderBackend`],
//! [`rendering::PointProjector`], [`geodetic::Reprojector`]) so the core
//! is callable and testable without a live rendering context.

pub mod compositor;
pub mod core;
pub mod geodetic;
pub mod rendering;
pub mod tiles;

// Re-export public API
pub use crate::core::{
    config::{RasterLayerOptions, ReferenceSystem, Resampling},
    geo::{LatLng, Point, TileCoord},
    tile_id::OverscaledTileId,
};

pub use compositor::{
    fade::{evaluate_fade, Fade, FadeEvaluation},
    lod::{resolve_lod, AncestorRemap, ResolvedTile},
    offset::{alignment_offset, OffsetVector},
    FrameParams, TileBatch, TileCompositor,
};

pub use geodetic::{Reprojector, Wgs84ToGcj02};

pub use rendering::{
    backend::{DrawQueue, RasterDrawCall, RenderBackend, RenderPass},
    camera::{PointProjector, ViewCamera},
};

pub use tiles::{MemoryTileStore, TextureHandle, TileRecord, TileStore};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    /// A tile that the visibility pass handed to the compositor has no
    /// loaded record in the store. The store contract guarantees every
    /// visible tile is loaded before it reaches the draw stage, so this
    /// is a collaborator bug, not a recoverable condition.
    #[error("no loaded record for visible tile {0}")]
    TileUnavailable(OverscaledTileId),

    #[error("invalid layer configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = CompositeError;
