//! Per-frame raster compositing orchestration.
//!
//! `TileCompositor::composite` runs once per rendered frame on the
//! rendering thread: it resolves LOD and fade state for every visible
//! tile, derives the batch's alignment offset when the layer imagery
//! lives in a secondary reference system, and emits one draw invocation
//! per tile in coarse-to-fine order. No suspension points; every
//! external lookup is a synchronous in-memory query.

pub mod fade;
pub mod lod;
pub mod offset;

use crate::core::config::{RasterLayerOptions, Resampling};
use crate::core::tile_id::OverscaledTileId;
use crate::geodetic::Reprojector;
use crate::rendering::backend::{
    BlendMode, DepthMode, FilterMode, RasterDrawCall, RenderBackend, RenderPass, StencilMode,
    TextureBinding, TileGeometry,
};
use crate::rendering::camera::{translate_matrix, ViewCamera};
use crate::tiles::TileStore;
use crate::Result;
use self::fade::evaluate_fade;
use self::lod::resolve_lod;
use self::offset::{alignment_offset, OffsetVector};
use std::time::Instant;

/// Frame-singleton state, passed explicitly per call so the compositor
/// never reads ambient renderer globals.
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    pub pass: RenderPass,
    pub now: Instant,
    /// True while the camera is panning or zooming; tile matrices skip
    /// pixel snapping so motion stays smooth.
    pub moving: bool,
}

/// The visible set for one layer this frame.
///
/// A static image source contributes a single quad with its own bounds
/// geometry and no tile pyramid behind it, so it gets its own variant
/// instead of a runtime type check.
#[derive(Debug, Clone)]
pub enum TileBatch {
    Tiled(Vec<OverscaledTileId>),
    StaticImage(OverscaledTileId),
}

impl TileBatch {
    fn is_empty(&self) -> bool {
        match self {
            TileBatch::Tiled(ids) => ids.is_empty(),
            TileBatch::StaticImage(_) => false,
        }
    }
}

/// Orchestrates LOD resolution, fade evaluation and draw emission for
/// raster tile layers. Holds the injected reference-system conversion;
/// everything else arrives per frame.
pub struct TileCompositor {
    reprojector: Box<dyn Reprojector>,
    /// Opaque tag forwarded on every draw call, typically the layer id
    pub tag: String,
}

impl TileCompositor {
    pub fn new(tag: impl Into<String>, reprojector: Box<dyn Reprojector>) -> Self {
        Self {
            reprojector,
            tag: tag.into(),
        }
    }

    /// Composites one layer's visible tiles into draw invocations.
    ///
    /// Early-returns without touching the store when the frame is in the
    /// wrong render pass, the layer is fully transparent, or nothing is
    /// visible — a skipped frame, not a failure.
    pub fn composite<S, B>(
        &self,
        store: &mut S,
        options: &RasterLayerOptions,
        batch: &TileBatch,
        frame: &FrameParams,
        camera: &ViewCamera,
        backend: &mut B,
    ) -> Result<()>
    where
        S: TileStore,
        B: RenderBackend,
    {
        if frame.pass != RenderPass::Translucent {
            return Ok(());
        }
        if options.opacity == 0.0 {
            log::trace!("layer {} fully transparent, skipping", self.tag);
            return Ok(());
        }
        if batch.is_empty() {
            return Ok(());
        }

        let align_offset = if options.alignment_active() {
            let first = match batch {
                TileBatch::Tiled(ids) => &ids[0],
                TileBatch::StaticImage(id) => id,
            };
            alignment_offset(first, self.reprojector.as_ref(), camera)
        } else {
            OffsetVector::ZERO
        };

        let filter = match options.resampling {
            Resampling::Nearest => FilterMode::Nearest,
            Resampling::Linear => FilterMode::Linear,
        };
        // Pixel-snap tile placement only while the camera is at rest.
        let align = !frame.moving;
        let ideal_zoom = camera.covering_zoom_level(store.tile_size(), store.round_zoom());

        match batch {
            TileBatch::StaticImage(id) => {
                self.draw_static_image(store, options, id, camera, align_offset, filter, align, backend)
            }
            TileBatch::Tiled(ids) => self.draw_tiled(
                store,
                options,
                ids,
                frame,
                camera,
                align_offset,
                filter,
                align,
                ideal_zoom,
                backend,
            ),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_tiled<S, B>(
        &self,
        store: &mut S,
        options: &RasterLayerOptions,
        ids: &[OverscaledTileId],
        frame: &FrameParams,
        camera: &ViewCamera,
        align_offset: OffsetVector,
        filter: FilterMode,
        align: bool,
        ideal_zoom: u8,
        backend: &mut B,
    ) -> Result<()>
    where
        S: TileStore,
        B: RenderBackend,
    {
        // Coarse tiles draw first at lower depth sublayers; finer tiles
        // then draw over them with the depth test rejecting pixels that
        // a previous sublayer already covered.
        let mut ordered: Vec<OverscaledTileId> = ids.to_vec();
        ordered.sort_by_key(|id| id.overscaled_z);
        let min_z = ordered[0].overscaled_z;

        log::debug!(
            "compositing {} tiles for layer {} (z {}..={})",
            ordered.len(),
            self.tag,
            min_z,
            ordered.last().map(|id| id.overscaled_z).unwrap_or(min_z)
        );

        let depth_write = options.opacity == 1.0;
        let fade_duration = options.fade_duration();

        for id in &ordered {
            store.register_fade_duration(id, fade_duration);

            let resolved = resolve_lod(store, id, min_z)?;
            let eval = evaluate_fade(
                resolved.tile,
                resolved.ancestor,
                fade_duration,
                frame.now,
                ideal_zoom,
            );

            let primary = TextureBinding {
                handle: resolved.tile.texture,
                filter,
            };
            let secondary = TextureBinding {
                handle: resolved
                    .ancestor
                    .map(|a| a.texture)
                    .unwrap_or(resolved.tile.texture),
                filter,
            };
            let remap = resolved.remap;
            let order_key = resolved.order_key;
            let fade = eval.fade;
            let fade_complete = eval.refresh_window_elapsed;

            // The single documented mutation: clear the refresh flag
            // once the fade window has fully elapsed.
            if fade_complete {
                store.mark_fade_complete(id);
            }

            backend.draw(RasterDrawCall {
                tile: *id,
                transform: self.tile_transform(camera, id, store.tile_size(), align, align_offset),
                primary,
                secondary,
                ancestor_remap: remap,
                opacity: fade.opacity,
                mix: fade.mix,
                depth: DepthMode::for_sublayer(order_key, depth_write),
                stencil: StencilMode::CoverageRef(id.overscaled_z),
                blend: BlendMode::Alpha,
                geometry: TileGeometry::TileQuad,
                tag: self.tag.clone(),
            });
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_static_image<S, B>(
        &self,
        store: &S,
        options: &RasterLayerOptions,
        id: &OverscaledTileId,
        camera: &ViewCamera,
        align_offset: OffsetVector,
        filter: FilterMode,
        align: bool,
        backend: &mut B,
    ) -> Result<()>
    where
        S: TileStore,
        B: RenderBackend,
    {
        // A static image has no tile pyramid: no ancestor fallback, no
        // fade, no coverage masking.
        let resolved = resolve_lod(store, id, id.overscaled_z)?;
        let binding = TextureBinding {
            handle: resolved.tile.texture,
            filter,
        };

        backend.draw(RasterDrawCall {
            tile: *id,
            transform: self.tile_transform(camera, id, store.tile_size(), align, align_offset),
            primary: binding,
            secondary: binding,
            ancestor_remap: lod::AncestorRemap::IDENTITY,
            opacity: 1.0,
            mix: 0.0,
            depth: DepthMode::for_sublayer(0, options.opacity == 1.0),
            stencil: StencilMode::Disabled,
            blend: BlendMode::Alpha,
            geometry: TileGeometry::ImageBounds,
            tag: self.tag.clone(),
        });

        Ok(())
    }

    fn tile_transform(
        &self,
        camera: &ViewCamera,
        id: &OverscaledTileId,
        tile_size: u32,
        align: bool,
        offset: OffsetVector,
    ) -> [f64; 6] {
        let matrix = camera.tile_matrix(id, tile_size, align);
        if offset.is_zero() {
            matrix
        } else {
            // The offset is measured in device pixels; matrix
            // translations are in logical pixels at half that density.
            translate_matrix(matrix, offset.x as f64 / 2.0, offset.y as f64 / 2.0)
        }
    }
}
