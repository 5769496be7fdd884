use glam::DVec2;

use crate::geo::ContainerSize;
use crate::render::transform::ZoomTransform;

/// Straight (non-premultiplied) RGBA.
pub type Color = [u8; 4];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadCurve {
    pub start: DVec2,
    pub control: DVec2,
    pub end: DVec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

/// Raster overlay drawn over the map each frame.
///
/// Geometry arrives in map (projected) space; the surface applies the
/// current transform and its own device pixel ratio. Each stroke or fill
/// call composites its shapes as a single path, so overlapping shapes in
/// one call do not darken each other.
pub trait OverlaySurface {
    fn resize(&mut self, size: ContainerSize);

    fn clear(&mut self);

    fn set_transform(&mut self, transform: ZoomTransform);

    /// `width` is in map units and scales with zoom.
    fn stroke_curves(&mut self, curves: &[QuadCurve], width: f64, color: Color);

    /// Radii are in map units and scale with zoom.
    fn fill_circles(&mut self, circles: &[Circle], color: Color);
}
