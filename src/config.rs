use glam::Vec2;
use crate::simulation::error::SimError;
use crate::simulation::grid_params::{GridParams, MIN_CELL_SIZE};
use crate::simulation::sim_params::Boundary;

/// Startup settings of a simulation. Read once when the world is built.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Size of the simulated area, centred on the origin.
    pub viewport: Vec2,
    /// Number of particle slots. Fixed for the lifetime of the simulation.
    pub capacity: usize,
    pub initial_particles: usize,
    /// Largest radius any particle will have; sizes the grid cells.
    pub particle_radius: f32,
    pub min_cell_size: f32,
    pub sub_steps: u32,
    /// Upper bound on the frame delta, in seconds.
    pub max_frame_delta: f32,
    pub gravity: Vec2,
    pub boundary: Boundary,
    pub interaction_strength: f32,
}

impl SimConfig {
    /// Defaults for a window of `viewport` pixels: a containment circle
    /// 20 px inside the shorter half-height, y pointing down.
    pub fn for_viewport(viewport: Vec2) -> Self {
        Self {
            viewport,
            capacity: 20_000,
            initial_particles: 4_000,
            particle_radius: 5.0,
            min_cell_size: MIN_CELL_SIZE,
            sub_steps: 8,
            max_frame_delta: 1.0 / 60.0,
            gravity: Vec2::new(0.0, 1000.0),
            boundary: Boundary::Circle {
                center: Vec2::ZERO,
                radius: (viewport.y / 2.0 - 20.0).max(0.0),
            },
            interaction_strength: 4000.0,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let fail = |reason: String| Err(SimError::InvalidConfig(reason));
        if self.capacity == 0 {
            return fail("capacity must be at least one particle".into());
        }
        if self.initial_particles > self.capacity {
            return fail(format!(
                "{} initial particles do not fit in {} slots",
                self.initial_particles, self.capacity
            ));
        }
        if self.sub_steps == 0 {
            return fail("at least one sub-step per frame is required".into());
        }
        if !(self.max_frame_delta > 0.0) {
            return fail(format!("max frame delta must be positive, got {}", self.max_frame_delta));
        }
        if !(self.particle_radius > 0.0) {
            return fail(format!("particle radius must be positive, got {}", self.particle_radius));
        }
        if !(self.viewport.x > 0.0 && self.viewport.y > 0.0) {
            return fail(format!("viewport {} is empty", self.viewport));
        }
        Ok(())
    }

    pub fn grid_params(&self) -> Result<GridParams, SimError> {
        GridParams::for_viewport(self.viewport, self.particle_radius, self.min_cell_size)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::for_viewport(Vec2::new(1280.0, 720.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        let grid = config.grid_params().unwrap();
        assert_eq!(grid.cell_size(), 20.0);
        assert_eq!((grid.width(), grid.height()), (64, 36));
    }

    #[test]
    fn rejects_seed_larger_than_pool() {
        let config = SimConfig {
            initial_particles: 11,
            capacity: 10,
            ..SimConfig::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn large_radius_widens_cells() {
        let config = SimConfig {
            particle_radius: 15.0,
            ..SimConfig::default()
        };
        assert_eq!(config.grid_params().unwrap().cell_size(), 30.0);
    }
}
