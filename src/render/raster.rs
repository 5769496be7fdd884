//! In-memory raster overlay backed by an `image::RgbaImage`.
//!
//! Used for headless rendering and as the reference implementation of
//! [`OverlaySurface`]. Shapes are rasterised with a simple distance-based
//! coverage estimate into a scratch mask, then composited source-over.
use std::path::Path;

use glam::DVec2;
use image::{Rgba, RgbaImage};

use crate::constants::CURVE_SEGMENT_PX;
use crate::error::FlowResult;
use crate::geo::ContainerSize;
use crate::math_utils::quadratic_point;
use crate::render::surface::{Circle, Color, OverlaySurface, QuadCurve};
use crate::render::transform::ZoomTransform;

const MAX_CURVE_SEGMENTS: usize = 256;

/// Per-pixel coverage of the path being built, with the touched bounds.
#[derive(Debug, Clone)]
struct CoverageMask {
    width: u32,
    height: u32,
    values: Vec<f32>,
    dirty: Option<(u32, u32, u32, u32)>,
}

impl CoverageMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; (width * height) as usize],
            dirty: None,
        }
    }

    fn mark(&mut self, x: u32, y: u32, coverage: f32) {
        let slot = &mut self.values[(y * self.width + x) as usize];
        if coverage > *slot {
            *slot = coverage;
        }
        self.dirty = Some(match self.dirty {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }

    /// Pixel range covering the box `min..max`, clipped to the mask.
    fn pixel_bounds(&self, min: DVec2, max: DVec2) -> Option<(u32, u32, u32, u32)> {
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(self.width as f64 - 1.0);
        let y1 = max.y.ceil().min(self.height as f64 - 1.0);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

#[derive(Debug, Clone)]
pub struct RasterOverlay {
    size: ContainerSize,
    image: RgbaImage,
    mask: CoverageMask,
    transform: ZoomTransform,
}

impl RasterOverlay {
    pub fn new(size: ContainerSize) -> Self {
        let (width, height) = size.device_pixels();
        Self {
            size,
            image: RgbaImage::new(width, height),
            mask: CoverageMask::new(width, height),
            transform: ZoomTransform::IDENTITY,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn size(&self) -> ContainerSize {
        self.size
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    /// Pixel at CSS coordinates `(x, y)`, if inside the surface.
    pub fn pixel_at(&self, point: DVec2) -> Option<Rgba<u8>> {
        let device = point * self.size.device_pixel_ratio;
        if device.x < 0.0 || device.y < 0.0 {
            return None;
        }
        let (x, y) = (device.x as u32, device.y as u32);
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        Some(*self.image.get_pixel(x, y))
    }

    pub fn painted_pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] > 0).count()
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> FlowResult<()> {
        self.image.save(path)?;
        Ok(())
    }

    fn to_device(&self, point: DVec2) -> DVec2 {
        self.transform.apply(point) * self.size.device_pixel_ratio
    }

    fn device_scale(&self) -> f64 {
        self.transform.k * self.size.device_pixel_ratio
    }

    fn cover_segment(&mut self, a: DVec2, b: DVec2, width: f64) {
        let half = width * 0.5;
        let reach = half.max(0.5) + 1.0;
        let Some((x0, y0, x1, y1)) = self.mask.pixel_bounds(a.min(b) - reach, a.max(b) + reach)
        else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let center = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let distance = distance_to_segment(center, a, b);
                // lines thinner than a pixel fade out instead of vanishing
                let coverage = if width >= 1.0 {
                    (half + 0.5 - distance).clamp(0.0, 1.0)
                } else {
                    width * (1.0 - distance).max(0.0)
                };
                if coverage > 0.0 {
                    self.mask.mark(x, y, coverage as f32);
                }
            }
        }
    }

    fn cover_disc(&mut self, center: DVec2, radius: f64) {
        let reach = radius + 1.0;
        let Some((x0, y0, x1, y1)) = self.mask.pixel_bounds(center - reach, center + reach) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let pixel = DVec2::new(x as f64 + 0.5, y as f64 + 0.5);
                let coverage = (radius + 0.5 - pixel.distance(center)).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.mask.mark(x, y, coverage as f32);
                }
            }
        }
    }

    /// Blends `color` through the mask and empties it.
    fn composite(&mut self, color: Color) {
        let Some((x0, y0, x1, y1)) = self.mask.dirty.take() else {
            return;
        };
        let source_alpha = color[3] as f32 / 255.0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let index = (y * self.mask.width + x) as usize;
                let coverage = std::mem::take(&mut self.mask.values[index]);
                if coverage <= 0.0 {
                    continue;
                }
                let pixel = self.image.get_pixel_mut(x, y);
                *pixel = blend_over(*pixel, color, source_alpha * coverage);
            }
        }
    }
}

impl OverlaySurface for RasterOverlay {
    fn resize(&mut self, size: ContainerSize) {
        *self = RasterOverlay {
            transform: self.transform,
            ..RasterOverlay::new(size)
        };
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn set_transform(&mut self, transform: ZoomTransform) {
        self.transform = transform;
    }

    fn stroke_curves(&mut self, curves: &[QuadCurve], width: f64, color: Color) {
        let device_width = width * self.device_scale();
        for curve in curves {
            let start = self.to_device(curve.start);
            let control = self.to_device(curve.control);
            let end = self.to_device(curve.end);

            let rough_length = start.distance(control) + control.distance(end);
            let segments = ((rough_length / CURVE_SEGMENT_PX).ceil() as usize).clamp(1, MAX_CURVE_SEGMENTS);
            let mut previous = start;
            for i in 1..=segments {
                let t = i as f64 / segments as f64;
                let next = quadratic_point(start, control, end, t);
                self.cover_segment(previous, next, device_width);
                previous = next;
            }
        }
        self.composite(color);
    }

    fn fill_circles(&mut self, circles: &[Circle], color: Color) {
        let scale = self.device_scale();
        for circle in circles {
            let center = self.to_device(circle.center);
            self.cover_disc(center, circle.radius * scale);
        }
        self.composite(color);
    }
}

fn distance_to_segment(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let length_squared = ab.length_squared();
    if length_squared == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Source-over for straight alpha.
fn blend_over(destination: Rgba<u8>, color: Color, alpha: f32) -> Rgba<u8> {
    let dst_alpha = destination.0[3] as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    if out_alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| {
        let value = (color[i] as f32 * alpha + destination.0[i] as f32 * dst_alpha * (1.0 - alpha))
            / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
