use glam::DVec2;
use rand::Rng;

use crate::config::FlowConfig;
use crate::flow::MigrationPath;
use crate::particle::simulator::reset_particle;
use crate::particle::Particle;

/// Particles owed to a path carrying `volume` out of `total_volume`.
///
/// Rounds up, so any path with volume gets at least one. Summed over all
/// paths this can exceed `max_particles` by up to `paths - 1`. Non-finite
/// inputs get nothing.
pub fn particle_count(volume: f64, total_volume: f64, max_particles: usize) -> usize {
    if !(total_volume > 0.0 && total_volume.is_finite()) || !(volume > 0.0 && volume.is_finite()) {
        return 0;
    }
    ((volume / total_volume) * max_particles as f64).ceil() as usize
}

/// Builds the population for `paths`, spread over random starting progress
/// so the flow appears already under way.
pub fn allocate(
    paths: &[MigrationPath],
    total_volume: f64,
    config: &FlowConfig,
    rng: &mut impl Rng,
) -> Vec<Particle> {
    let mut particles = Vec::new();
    for (index, path) in paths.iter().enumerate() {
        let count = particle_count(path.total_volume, total_volume, config.max_particles);
        particles.reserve(count);
        for _ in 0..count {
            let mut particle = Particle {
                path: index,
                category: path.category,
                progress: 0.0,
                duration_ms: 0.0,
                size: 0.0,
                position: DVec2::ZERO,
                started: false,
            };
            reset_particle(&mut particle, path, config, rng);
            particle.progress = rng.random::<f64>();
            particles.push(particle);
        }
    }
    particles
}
