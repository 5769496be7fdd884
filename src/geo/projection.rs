use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use glam::DVec2;

// keeps the poles finite
const MAX_LATITUDE: f64 = 89.9;

/// Spherical Mercator from lon/lat degrees to screen space (y grows down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    pub scale: f64,
    pub translate: DVec2,
}

impl Default for Mercator {
    fn default() -> Self {
        Self {
            scale: 961.0 / TAU,
            translate: DVec2::new(480.0, 250.0),
        }
    }
}

impl Mercator {
    /// Unit-scale projection with y already flipped for screen space.
    fn raw(lonlat: DVec2) -> DVec2 {
        let lambda = lonlat.x.to_radians();
        let phi = lonlat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        DVec2::new(lambda, -(FRAC_PI_4 + phi / 2.0).tan().ln())
    }

    pub fn project(&self, lonlat: DVec2) -> DVec2 {
        self.translate + Self::raw(lonlat) * self.scale
    }

    /// Scale and center so every point fits inside `size`.
    ///
    /// Falls back to the default projection when there is nothing to fit.
    pub fn fit_size<'a>(size: DVec2, points: impl IntoIterator<Item = &'a DVec2>) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for point in points {
            let p = Self::raw(*point);
            min = min.min(p);
            max = max.max(p);
        }
        if !min.is_finite() || !max.is_finite() {
            return Self::default();
        }

        let extent = max - min;
        let k = (size.x / extent.x).min(size.y / extent.y);
        if !k.is_finite() || k <= 0.0 {
            return Self {
                scale: 1.0,
                translate: size * 0.5 - (min + max) * 0.5,
            };
        }
        Self {
            scale: k,
            translate: (size - (min + max) * k) * 0.5,
        }
    }

    /// Inverse of [`Mercator::project`], back to lon/lat degrees.
    pub fn invert(&self, point: DVec2) -> DVec2 {
        let raw = (point - self.translate) / self.scale;
        let phi = 2.0 * (-raw.y).exp().atan() - FRAC_PI_2;
        DVec2::new(raw.x.to_degrees(), phi.to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn korea_box() -> Vec<DVec2> {
        vec![
            DVec2::new(125.0, 33.0),
            DVec2::new(130.0, 33.0),
            DVec2::new(130.0, 38.5),
            DVec2::new(125.0, 38.5),
        ]
    }

    #[test]
    fn fit_size_touches_one_axis_and_centers_the_other() {
        let size = DVec2::new(800.0, 600.0);
        let projection = Mercator::fit_size(size, &korea_box());
        let projected: Vec<DVec2> = korea_box().iter().map(|p| projection.project(*p)).collect();

        let min = projected.iter().fold(DVec2::splat(f64::INFINITY), |a, p| a.min(*p));
        let max = projected.iter().fold(DVec2::splat(f64::NEG_INFINITY), |a, p| a.max(*p));

        // taller than wide, so height is the binding axis
        assert_abs_diff_eq!(min.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(max.y, 600.0, epsilon = 1e-6);
        assert_abs_diff_eq!(min.x + max.x, 800.0, epsilon = 1e-6);
    }

    #[test]
    fn north_is_up() {
        let projection = Mercator::fit_size(DVec2::new(500.0, 500.0), &korea_box());
        let south = projection.project(DVec2::new(127.0, 34.0));
        let north = projection.project(DVec2::new(127.0, 38.0));
        assert!(north.y < south.y);
    }

    #[test]
    fn invert_round_trips() {
        let projection = Mercator::fit_size(DVec2::new(640.0, 480.0), &korea_box());
        let seoul = DVec2::new(126.978, 37.5665);
        let back = projection.invert(projection.project(seoul));
        assert_abs_diff_eq!(back.x, seoul.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, seoul.y, epsilon = 1e-9);
    }

    #[test]
    fn empty_input_uses_default() {
        let projection = Mercator::fit_size(DVec2::new(100.0, 100.0), &[]);
        assert_eq!(projection, Mercator::default());
    }
}
