//! Position Verlet step with neighbour overlap resolution.
//!
//! Every particle is advanced independently from the read-only source
//! store, so the whole pass runs in parallel without synchronisation.

use glam::Vec2;
use rayon::prelude::*;
use crate::simulation::particle::Particle;
use crate::simulation::particle_store::ParticleStore;
use crate::simulation::sim_params::{Boundary, Interaction, SimParams};
use crate::simulation::spatial_grid_index::{SpatialGridIndex, UNUSED_BIN};

/// Extra distance added when pushing an overlapping pair apart, so the
/// resolved pair ends up at least touching despite rounding.
pub const SEPARATION_SLOP: f32 = 1e-3;

/// Advances every slot of `current` into the same slot of `next`.
/// Free slots are copied through unchanged.
pub fn integrate(current: &ParticleStore, next: &mut ParticleStore, index: &SpatialGridIndex, params: &SimParams) {
    next.particles_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| *out = integrate_particle(i, current, index, params));
}

/// One sub-step of particle `i`.
///
/// The returned record has the integrated, overlap-corrected and
/// boundary-clamped position, the pre-step position as its previous
/// position, and a cleared acceleration.
pub fn integrate_particle(i: usize, current: &ParticleStore, index: &SpatialGridIndex, params: &SimParams) -> Particle {
    let particle = current.particles()[i];
    if !particle.is_alive() {
        return particle;
    }

    let dt = params.delta_time;
    let mut acceleration = particle.acceleration + params.gravity;
    if let Some(interaction) = &params.interaction {
        acceleration += interaction_acceleration(particle.position, interaction);
    }

    let mut position = particle.position + particle.velocity() + acceleration * dt * dt;
    position += overlap_correction(i, &particle, current, index);
    position = apply_boundary(position, particle.radius, &params.boundary);

    let mut next = particle;
    next.position = position;
    next.previous_position = particle.position;
    next.acceleration = Vec2::ZERO;
    next
}

/// Sum of the pushes particle `i` receives from every overlapping neighbour
/// in its own cell and the eight around it.
pub fn overlap_correction(i: usize, particle: &Particle, current: &ParticleStore, index: &SpatialGridIndex) -> Vec2 {
    let home = index.bin_of(i);
    if home == UNUSED_BIN {
        return Vec2::ZERO;
    }

    let mut correction = Vec2::ZERO;
    for cell in index.grid().neighbourhood(home) {
        for j in index.particles_in_bin(cell) {
            if j == i {
                continue;
            }
            if let Some(other) = current.get(j) {
                correction += pair_correction(i, particle, j, other);
            }
        }
    }
    correction
}

/// Displacement of `a` away from `b` when the two overlap: half the
/// overlap depth each, so `b` computes the exact opposite push.
///
/// Coincident particles have no separation direction; they are pushed
/// apart along the x axis, the lower index toward +x.
pub fn pair_correction(i: usize, a: &Particle, j: usize, b: &Particle) -> Vec2 {
    let min_distance = a.radius + b.radius;
    let delta = a.position - b.position;
    let distance_squared = delta.length_squared();
    if distance_squared >= min_distance * min_distance {
        return Vec2::ZERO;
    }

    let distance = distance_squared.sqrt();
    let normal = if distance > f32::EPSILON {
        delta / distance
    } else if i < j {
        Vec2::X
    } else {
        Vec2::NEG_X
    };
    normal * (0.5 * (min_distance - distance + SEPARATION_SLOP))
}

/// Clamps a particle of `radius` at `position` inside `boundary`.
pub fn apply_boundary(position: Vec2, radius: f32, boundary: &Boundary) -> Vec2 {
    match *boundary {
        Boundary::None => position,
        Boundary::Circle { center, radius: bound } => {
            let limit = (bound - radius).max(0.0);
            let offset = position - center;
            let distance = offset.length();
            if distance > limit {
                center + offset * (limit / distance)
            } else {
                position
            }
        }
        Boundary::Box { center, half_extent } => {
            let reach = (half_extent - Vec2::splat(radius)).max(Vec2::ZERO);
            position.clamp(center - reach, center + reach)
        }
    }
}

/// Constant-magnitude pull toward the interaction point; zero on the point itself.
pub fn interaction_acceleration(position: Vec2, interaction: &Interaction) -> Vec2 {
    let to_point = interaction.point - position;
    let distance = to_point.length();
    if distance <= f32::EPSILON {
        return Vec2::ZERO;
    }
    to_point / distance * interaction.strength
}
