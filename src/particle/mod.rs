pub mod allocator;
pub mod simulator;

pub use allocator::{allocate, particle_count};
pub use simulator::{advance_particle, reset_particle, ParticleSimulator};

use std::ops::Range;

use glam::DVec2;
use rand::Rng;

use crate::flow::FlowCategory;

/// One animated marker, bound to `paths[path]` for its whole life.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub path: usize,
    pub category: FlowCategory,
    /// Fraction of the path covered, in `[0, 1)`.
    pub progress: f64,
    /// Infinite for inert particles on degenerate paths.
    pub duration_ms: f64,
    pub size: f64,
    pub position: DVec2,
    /// Set once `position` reflects `progress`; cleared on every reset.
    pub started: bool,
}

impl Particle {
    pub fn is_inert(&self) -> bool {
        self.duration_ms.is_infinite()
    }
}

/// Uniform draw from `range`, or its start when the range is empty or
/// unbounded.
pub(crate) fn sample_range(range: &Range<f64>, rng: &mut impl Rng) -> f64 {
    if range.start.is_finite() && range.end.is_finite() && range.start < range.end {
        rng.random_range(range.clone())
    } else {
        range.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use more_asserts::{assert_ge, assert_lt};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sample_range_handles_degenerate_ranges() {
        let mut rng = StdRng::seed_from_u64(4);
        let v = sample_range(&(2.0..3.0), &mut rng);
        assert_ge!(v, 2.0);
        assert_lt!(v, 3.0);
        assert_eq!(sample_range(&(5.0..5.0), &mut rng), 5.0);
        assert_eq!(sample_range(&(5.0..1.0), &mut rng), 5.0);
        assert_eq!(sample_range(&(1.0..f64::INFINITY), &mut rng), 1.0);
    }
}
