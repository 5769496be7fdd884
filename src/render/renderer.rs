use crate::constants::*;
use crate::flow::{FlowCategory, PathSet};
use crate::math_utils::log_zoom_divisor;
use crate::particle::ParticleSimulator;
use crate::render::surface::{Circle, Color, OverlaySurface, QuadCurve};
use crate::render::transform::ZoomTransform;

pub fn category_color(category: FlowCategory) -> Color {
    match category {
        FlowCategory::Normal => NORMAL_PARTICLE_COLOR,
        FlowCategory::Inflow => INFLOW_PARTICLE_COLOR,
        FlowCategory::Outflow => OUTFLOW_PARTICLE_COLOR,
    }
}

/// Map-unit stroke width at zoom `k`; thins out as the user zooms in.
pub fn path_stroke_width(k: f64) -> f64 {
    PATH_STROKE_WIDTH / log_zoom_divisor(k)
}

/// Map-unit radius of a particle of `size` at zoom `k`.
pub fn particle_radius(size: f64, k: f64) -> f64 {
    size * PARTICLE_RADIUS_FACTOR / log_zoom_divisor(k)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub curves: usize,
    pub particles: usize,
}

/// Draws one frame: every path as a faint curve, then the started
/// particles in `normal`, `inflow`, `outflow` batches.
pub fn render_frame<S: OverlaySurface + ?Sized>(
    surface: &mut S,
    paths: &PathSet,
    particles: &ParticleSimulator,
    transform: ZoomTransform,
) -> FrameStats {
    surface.clear();
    surface.set_transform(transform);

    let curves: Vec<QuadCurve> = paths
        .iter()
        .map(|path| QuadCurve {
            start: path.start(),
            control: path.control,
            end: path.end(),
        })
        .collect();
    if !curves.is_empty() {
        surface.stroke_curves(&curves, path_stroke_width(transform.k), PATH_STROKE_COLOR);
    }

    let mut drawn = 0;
    for category in FlowCategory::DRAW_ORDER {
        let circles: Vec<Circle> = particles
            .live_positions(category)
            .map(|(center, size)| Circle {
                center,
                radius: particle_radius(size, transform.k),
            })
            .collect();
        if circles.is_empty() {
            continue;
        }
        drawn += circles.len();
        surface.fill_circles(&circles, category_color(category));
    }

    FrameStats {
        curves: curves.len(),
        particles: drawn,
    }
}
