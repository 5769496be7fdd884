pub mod map_svg;
pub mod raster;
pub mod renderer;
pub mod surface;
pub mod transform;

pub use map_svg::{label_opacity, render_map_svg};
pub use raster::RasterOverlay;
pub use renderer::{render_frame, FrameStats};
pub use surface::{Circle, Color, OverlaySurface, QuadCurve};
pub use transform::{ZoomBehavior, ZoomTransform};
