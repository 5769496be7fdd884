use glam::DVec2;

use crate::constants::{ZOOM_SCALE_MAX, ZOOM_SCALE_MIN};

/// Pan/zoom applied identically to the vector map and the raster overlay:
/// `screen = point * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    pub fn translation(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn apply(&self, point: DVec2) -> DVec2 {
        point * self.k + self.translation()
    }

    pub fn invert(&self, point: DVec2) -> DVec2 {
        (point - self.translation()) / self.k
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.k.is_finite()
    }

    /// SVG `transform` attribute value.
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

/// Gesture handling with a bounded scale, like a map zoom widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBehavior {
    scale_extent: [f64; 2],
}

impl ZoomBehavior {
    /// Bounds are reordered if inverted. Non-finite or non-positive bounds
    /// fall back to the default extent.
    pub fn new(scale_extent: [f64; 2]) -> Self {
        let [a, b] = scale_extent;
        let scale_extent = if a.is_finite() && b.is_finite() && a > 0.0 && b > 0.0 {
            [a.min(b), a.max(b)]
        } else {
            [ZOOM_SCALE_MIN, ZOOM_SCALE_MAX]
        };
        Self { scale_extent }
    }

    pub fn scale_extent(&self) -> [f64; 2] {
        self.scale_extent
    }

    pub fn clamp_scale(&self, k: f64) -> f64 {
        k.clamp(self.scale_extent[0], self.scale_extent[1])
    }

    /// Clamps the scale of an externally supplied transform, keeping its
    /// translation.
    pub fn constrain(&self, transform: ZoomTransform) -> ZoomTransform {
        ZoomTransform {
            k: self.clamp_scale(transform.k),
            ..transform
        }
    }

    /// Multiplies the scale by `factor`, keeping the map point under
    /// `anchor` (screen space) fixed. Non-finite or non-positive factors and
    /// non-finite anchors leave `transform` unchanged.
    pub fn scale_by(&self, transform: ZoomTransform, factor: f64, anchor: DVec2) -> ZoomTransform {
        if !(factor.is_finite() && factor > 0.0) || !anchor.is_finite() {
            return transform;
        }
        let k = self.clamp_scale(transform.k * factor);
        let pinned = transform.invert(anchor);
        let translation = anchor - pinned * k;
        ZoomTransform::new(translation.x, translation.y, k)
    }

    /// Pans by a screen-space offset; non-finite offsets are ignored.
    pub fn translate_by(&self, transform: ZoomTransform, offset: DVec2) -> ZoomTransform {
        if !offset.is_finite() {
            return transform;
        }
        ZoomTransform::new(transform.x + offset.x, transform.y + offset.y, transform.k)
    }
}
