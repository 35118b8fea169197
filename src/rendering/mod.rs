pub mod backend;
pub mod camera;

pub use backend::{DrawQueue, RasterDrawCall, RenderBackend, RenderPass};
pub use camera::{PointProjector, ViewCamera};
