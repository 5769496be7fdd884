//! Geometry helpers shared by the path builder, simulator and renderer.
use glam::DVec2;

use crate::constants::LOG_ZOOM_FACTOR;

/// Point on the quadratic Bezier `start -> control -> end` at parameter `t`
///
/// # Examples
/// ```
/// use glam::DVec2;
/// use migration_flow::math_utils::quadratic_point;
///
/// let start = DVec2::new(0.0, 0.0);
/// let control = DVec2::new(5.0, 5.0);
/// let end = DVec2::new(10.0, 0.0);
/// assert_eq!(quadratic_point(start, control, end, 0.0), start);
/// assert_eq!(quadratic_point(start, control, end, 1.0), end);
/// assert_eq!(quadratic_point(start, control, end, 0.5), DVec2::new(5.0, 2.5));
/// ```
pub fn quadratic_point(start: DVec2, control: DVec2, end: DVec2, t: f64) -> DVec2 {
    let mt = 1.0 - t;
    start * (mt * mt) + control * (2.0 * mt * t) + end * (t * t)
}

/// Control point bending the chord `start -> end` sideways by `offset_ratio`
/// of its length, measured from the midpoint.
///
/// The offset is always along `(dy, -dx)`, so the return trip between the
/// same two regions bends to the opposite side and the arcs stay apart.
/// Returns `None` for coincident endpoints.
pub fn curve_control_point(start: DVec2, end: DVec2, offset_ratio: f64) -> Option<DVec2> {
    let delta = end - start;
    let distance = delta.length();
    if distance <= 0.0 {
        return None;
    }
    let midpoint = start + delta * 0.5;
    let perpendicular = DVec2::new(delta.y, -delta.x) / distance;
    Some(midpoint + perpendicular * (distance * offset_ratio))
}

/// Divisor that thins strokes and particles as the zoom scale `k` grows.
///
/// `ln(3k)` is only positive above `k = 1/3`, so smaller scales clamp to a
/// tiny positive value instead of flipping sign.
pub fn log_zoom_divisor(k: f64) -> f64 {
    (k * LOG_ZOOM_FACTOR).ln().max(1e-3)
}
