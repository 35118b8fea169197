//! Backend-agnostic draw invocations.
//!
//! The compositor does not talk to a GPU API. It emits one
//! [`RasterDrawCall`] per tile into a [`RenderBackend`], which a wgpu or
//! GL integration translates into real pipeline state. The bundled
//! [`DrawQueue`] simply records calls in submission order.

use crate::compositor::lod::AncestorRemap;
use crate::core::tile_id::OverscaledTileId;
use crate::tiles::TextureHandle;

/// Which stage of the frame is currently being rendered. Raster tiles
/// only draw during the translucent pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPass {
    Opaque,
    Translucent,
    Offscreen,
}

/// Depth comparison for tile sublayers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    Always,
}

/// Depth-test state for one draw. Lower-zoom tiles draw first at lower
/// sublayers; `Less` rejects pixels already covered by a finer tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthMode {
    pub func: DepthFunc,
    pub write: bool,
    pub sublayer: u8,
}

impl DepthMode {
    pub fn for_sublayer(sublayer: u8, write: bool) -> Self {
        Self {
            func: DepthFunc::Less,
            write,
            sublayer,
        }
    }

    pub fn disabled() -> Self {
        Self {
            func: DepthFunc::Always,
            write: false,
            sublayer: 0,
        }
    }
}

/// Stencil state for one draw. The overlap-masking scheme itself is
/// owned by the renderer; the compositor only selects between the
/// per-zoom coverage mask and no masking at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilMode {
    Disabled,
    /// Coverage mask reference for tiles rendered at this overscaled zoom
    CoverageRef(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// A texture sampler binding: which image, filtered how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
    pub handle: TextureHandle,
    pub filter: FilterMode,
}

/// Which vertex/index geometry the draw uses. Tiled sources share the
/// renderer's unit tile quad; a static image source carries its own
/// bounds geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileGeometry {
    TileQuad,
    ImageBounds,
}

/// One complete draw invocation for one tile.
#[derive(Debug, Clone)]
pub struct RasterDrawCall {
    pub tile: OverscaledTileId,
    /// 2D affine screen transform `[sx, 0, 0, sy, tx, ty]`, alignment
    /// offset already folded into the translation.
    pub transform: [f64; 6],
    /// The tile's own image, always the primary sampler
    pub primary: TextureBinding,
    /// Ancestor image blended in during the fade; rebinds the primary
    /// when no ancestor applies
    pub secondary: TextureBinding,
    /// Sub-rectangle of the secondary texture covering this tile
    pub ancestor_remap: AncestorRemap,
    pub opacity: f32,
    pub mix: f32,
    pub depth: DepthMode,
    pub stencil: StencilMode,
    pub blend: BlendMode,
    pub geometry: TileGeometry,
    /// Opaque draw-order/ID tag, typically the style layer id
    pub tag: String,
}

/// Consumes draw invocations in submission order. No return value: a
/// backend either executes the call or drops the frame wholesale.
pub trait RenderBackend {
    fn draw(&mut self, call: RasterDrawCall);
}

/// Recording backend: keeps every call in submission order.
///
/// Used by the test suite and by embedders that replay the queue into
/// their own GPU abstraction at the end of the frame.
#[derive(Debug, Default)]
pub struct DrawQueue {
    calls: Vec<RasterDrawCall>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RasterDrawCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl RenderBackend for DrawQueue {
    fn draw(&mut self, call: RasterDrawCall) {
        log::trace!(
            "queue draw {} opacity={:.3} mix={:.3} sublayer={}",
            call.tile,
            call.opacity,
            call.mix,
            call.depth.sublayer
        );
        self.calls.push(call);
    }
}
