use glam::{Vec2, Vec3};
use rand::Rng;
use crate::config::SimConfig;
use crate::simulation::color::{hsv_to_rgb, lerp};
use crate::simulation::error::SimError;
use crate::simulation::grid_params::GridParams;
use crate::simulation::particle::Particle;
use crate::simulation::sim_params::{Boundary, Interaction, SimParams};

/// The per-sub-step kernel a [`FrameDriver`] orchestrates.
///
/// A backend owns two particle buffers and the bin index. "Current" is the
/// buffer the next sub-step reads; `integrate` writes the other one and
/// `swap` flips the roles.
pub trait SimulationBackend {
    fn capacity(&self) -> usize;

    fn grid(&self) -> &GridParams;

    /// Called once before the sub-steps of a frame are issued.
    fn begin_frame(&mut self) {}

    /// Rebuilds the bin index from the current buffer.
    fn rebuild_index(&mut self) -> Result<(), SimError>;

    /// Integrates the current buffer into the next one.
    fn integrate(&mut self, params: &SimParams);

    fn swap(&mut self);

    /// Called once after the last sub-step of a frame.
    fn end_frame(&mut self) {}

    /// Overwrites slot `index` of the current buffer.
    fn write_particle(&mut self, index: usize, particle: &Particle);

    /// Which of the two buffers is current (0 or 1).
    fn current_slot(&self) -> usize;
}

/// Runs the fixed sub-step loop once per displayed frame and owns the
/// particle pool's occupancy.
pub struct FrameDriver<B: SimulationBackend> {
    backend: B,
    occupied: Vec<bool>,
    sub_steps: u32,
    max_frame_delta: f32,
    viewport: Vec2,
    boundary: Boundary,
    gravity: Vec2,
    interaction_strength: f32,
    total_time: f32,
    frame_count: u64,
}

impl<B: SimulationBackend> FrameDriver<B> {
    /// Wraps an empty backend. Particles are only ever added through
    /// [`FrameDriver::spawn`].
    pub fn new(backend: B, config: &SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let occupied = vec![false; backend.capacity()];
        Ok(Self {
            backend,
            occupied,
            sub_steps: config.sub_steps,
            max_frame_delta: config.max_frame_delta,
            viewport: config.viewport,
            boundary: config.boundary,
            gravity: config.gravity,
            interaction_strength: config.interaction_strength,
            total_time: 0.0,
            frame_count: 0,
        })
    }

    /// Advances the simulation by one displayed frame.
    ///
    /// `frame_delta` is clamped to `[0, max_frame_delta]` and split into
    /// `sub_steps` equal sub-steps. Returns the buffer slot written by the
    /// last sub-step, which is the one to render.
    ///
    /// If a rebuild fails part way, the sub-steps already run (and their
    /// swaps) are kept, but `total_time` and `frame_count` stay at the
    /// previous frame. `end_frame` is still called.
    pub fn advance(&mut self, frame_delta: f32, interaction_point: Option<Vec2>) -> Result<usize, SimError> {
        let frame_delta = if frame_delta.is_finite() {
            frame_delta.clamp(0.0, self.max_frame_delta)
        } else {
            0.0
        };
        let sub_delta = frame_delta / self.sub_steps as f32;
        let frame_end = self.total_time + frame_delta;
        let interaction = interaction_point.map(|point| Interaction {
            point,
            strength: self.interaction_strength,
        });

        self.backend.begin_frame();
        let mut result = Ok(());
        for step in 0..self.sub_steps {
            let params = SimParams {
                total_time: frame_end - sub_delta * (self.sub_steps - 1 - step) as f32,
                delta_time: sub_delta,
                boundary: self.boundary,
                gravity: self.gravity,
                interaction,
            };
            if let Err(error) = self.backend.rebuild_index() {
                result = Err(error);
                break;
            }
            self.backend.integrate(&params);
            self.backend.swap();
        }
        self.backend.end_frame();
        result?;

        self.total_time = frame_end;
        self.frame_count += 1;
        Ok(self.backend.current_slot())
    }

    /// Places a particle at rest in the first free slot.
    ///
    /// Fails closed: a full pool, a non-finite position, a radius that is
    /// not positive and finite, or one the grid cannot resolve is rejected
    /// and nothing is written.
    pub fn spawn(&mut self, position: Vec2, color: Vec3, radius: f32) -> Result<usize, SimError> {
        if !position.is_finite() {
            return Err(SimError::InvalidPosition { x: position.x, y: position.y });
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(SimError::InvalidRadius { radius });
        }
        let max_radius = self.backend.grid().max_radius();
        if radius > max_radius {
            return Err(SimError::RadiusExceedsCell { radius, max_radius });
        }
        let slot = self
            .occupied
            .iter()
            .position(|occupied| !occupied)
            .ok_or(SimError::PoolFull { capacity: self.occupied.len() })?;

        self.backend.write_particle(slot, &Particle::new(position, color, radius));
        self.occupied[slot] = true;
        Ok(slot)
    }

    /// Spawns `count` amber particles at random points inside the boundary.
    /// Stops at the first rejected spawn and returns how many were placed.
    pub fn seed<R: Rng>(&mut self, rng: &mut R, count: usize, radius: f32) -> usize {
        for placed in 0..count {
            let position = random_point_inside(rng, &self.boundary, self.viewport, radius);
            let color = hsv_to_rgb(0.12, lerp(0.6, 0.9, rng.random::<f32>()), 1.0);
            if let Err(error) = self.spawn(position, color, radius) {
                log::warn!("Seeding stopped after {placed} particles: {error}");
                return placed;
            }
        }
        count
    }

    pub fn live_count(&self) -> usize {
        self.occupied.iter().filter(|occupied| **occupied).count()
    }

    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn sub_steps(&self) -> u32 {
        self.sub_steps
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// Uniform sample inside the boundary, or inside the viewport when there is none.
fn random_point_inside<R: Rng>(rng: &mut R, boundary: &Boundary, viewport: Vec2, radius: f32) -> Vec2 {
    match *boundary {
        Boundary::Circle { center, radius: bound } => {
            let reach = (bound - radius).max(0.0);
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let distance = reach * rng.random::<f32>().sqrt();
            center + Vec2::from_angle(angle) * distance
        }
        Boundary::Box { center, half_extent } => {
            let reach = (half_extent - Vec2::splat(radius)).max(Vec2::ZERO);
            center + Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0)) * reach
        }
        Boundary::None => {
            let reach = viewport / 2.0;
            Vec2::new(rng.random_range(-reach.x..=reach.x), rng.random_range(-reach.y..=reach.y))
        }
    }
}
