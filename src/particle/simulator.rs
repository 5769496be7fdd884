use glam::DVec2;
use rand::Rng;

use crate::config::FlowConfig;
use crate::flow::{FlowCategory, MigrationPath};
use crate::particle::{sample_range, Particle};

/// Puts a particle back at the start of its path with fresh timing.
///
/// Paths shorter than `min_path_distance` get an infinite duration and the
/// particle never moves again.
pub fn reset_particle(
    particle: &mut Particle,
    path: &MigrationPath,
    config: &FlowConfig,
    rng: &mut impl Rng,
) {
    particle.progress = 0.0;
    particle.started = false;
    if path.chord_length() < config.min_path_distance {
        particle.duration_ms = f64::INFINITY;
        return;
    }
    particle.duration_ms = sample_range(&config.particle_duration_ms, rng);
    particle.size = sample_range(&config.particle_size, rng);
}

/// Moves one particle `delta_ms` along its path.
///
/// Returns `true` when the particle reached the end this tick and was
/// recycled; its position is then left for the next tick to establish.
pub fn advance_particle(
    particle: &mut Particle,
    path: &MigrationPath,
    delta_ms: f64,
    config: &FlowConfig,
    rng: &mut impl Rng,
) -> bool {
    if particle.is_inert() {
        return false;
    }
    particle.progress += delta_ms.max(0.0) / particle.duration_ms;
    if particle.progress >= 1.0 {
        reset_particle(particle, path, config, rng);
        return true;
    }
    particle.position = path.point_at(particle.progress);
    particle.started = true;
    false
}

/// Sole owner of the particle population between rebuilds.
#[derive(Debug, Clone, Default)]
pub struct ParticleSimulator {
    particles: Vec<Particle>,
}

impl ParticleSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Swaps in a freshly allocated population.
    pub fn replace(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Advances every particle; returns how many wrapped around.
    ///
    /// `paths` must be the set the population was allocated against.
    pub fn advance(
        &mut self,
        paths: &[MigrationPath],
        delta_ms: f64,
        config: &FlowConfig,
        rng: &mut impl Rng,
    ) -> usize {
        let mut wrapped = 0;
        for particle in &mut self.particles {
            let Some(path) = paths.get(particle.path) else {
                continue;
            };
            if advance_particle(particle, path, delta_ms, config, rng) {
                wrapped += 1;
            }
        }
        wrapped
    }

    /// Positions of started particles in `category`, with their sizes.
    pub fn live_positions(
        &self,
        category: FlowCategory,
    ) -> impl Iterator<Item = (DVec2, f64)> + '_ {
        self.particles
            .iter()
            .filter(move |p| p.category == category && p.started)
            .map(|p| (p.position, p.size))
    }
}
