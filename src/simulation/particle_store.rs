use crate::simulation::particle::Particle;

/// A fixed-capacity pool of particle records.
///
/// The pool is allocated once and never resized: `len() == capacity()` at
/// all times, and unoccupied slots hold [`Particle::free`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::free(); capacity],
        }
    }

    /// Builds a pool holding `particles` in slots `0..particles.len()` and
    /// free slots up to `capacity`.
    pub fn from_particles(particles: &[Particle], capacity: usize) -> Self {
        let mut store = Self::with_capacity(capacity.max(particles.len()));
        store.particles[..particles.len()].copy_from_slice(particles);
        store
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Overwrites slot `index`. Returns false if the slot does not exist.
    pub fn set(&mut self, index: usize, particle: Particle) -> bool {
        match self.particles.get_mut(index) {
            Some(slot) => {
                *slot = particle;
                true
            }
            None => false,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }
}
