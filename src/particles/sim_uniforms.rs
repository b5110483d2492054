use glam::Vec2;
use crate::simulation::grid_params::GridParams;
use crate::simulation::sim_params::{Boundary, SimParams};

pub const BOUNDARY_NONE: u32 = 0;
pub const BOUNDARY_CIRCLE: u32 = 1;
pub const BOUNDARY_BOX: u32 = 2;

/// `SimParams` as the compute shader reads it. One record per sub-step.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimParamsUniform {
    pub total_time: f32,
    pub delta_time: f32,
    pub boundary_kind: u32,
    pub interaction_active: u32,
    pub boundary_center: Vec2,
    /// Circle: `(radius, radius)`. Box: the half extent.
    pub boundary_extent: Vec2,
    pub gravity: Vec2,
    pub interaction_point: Vec2,
    pub interaction_strength: f32,
    _pad: [f32; 3],
}

impl From<&SimParams> for SimParamsUniform {
    fn from(params: &SimParams) -> Self {
        let (boundary_kind, boundary_center, boundary_extent) = match params.boundary {
            Boundary::None => (BOUNDARY_NONE, Vec2::ZERO, Vec2::ZERO),
            Boundary::Circle { center, radius } => (BOUNDARY_CIRCLE, center, Vec2::splat(radius)),
            Boundary::Box { center, half_extent } => (BOUNDARY_BOX, center, half_extent),
        };
        let (interaction_active, interaction_point, interaction_strength) = match params.interaction {
            Some(interaction) => (1, interaction.point, interaction.strength),
            None => (0, Vec2::ZERO, 0.0),
        };
        Self {
            total_time: params.total_time,
            delta_time: params.delta_time,
            boundary_kind,
            interaction_active,
            boundary_center,
            boundary_extent,
            gravity: params.gravity,
            interaction_point,
            interaction_strength,
            _pad: [0.0; 3],
        }
    }
}

/// Grid layout and pool size, constant for the lifetime of a simulation.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BinParamsUniform {
    pub cell_size: f32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub cell_count: u32,
    pub origin: Vec2,
    pub num_particles: u32,
    _pad: u32,
}

impl BinParamsUniform {
    pub fn new(grid: &GridParams, num_particles: u32) -> Self {
        Self {
            cell_size: grid.cell_size(),
            grid_width: grid.width(),
            grid_height: grid.height(),
            cell_count: grid.cell_count() as u32,
            origin: grid.origin(),
            num_particles,
            _pad: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::sim_params::Interaction;

    #[test]
    fn uniform_sizes_match_the_shader() {
        assert_eq!(size_of::<SimParamsUniform>(), 64);
        assert_eq!(size_of::<BinParamsUniform>(), 32);
    }

    #[test]
    fn circle_boundary_and_interaction_are_flattened() {
        let params = SimParams::new(0.002)
            .with_boundary(Boundary::Circle { center: Vec2::new(1.0, 2.0), radius: 300.0 })
            .with_interaction(Some(Interaction { point: Vec2::new(5.0, 6.0), strength: -10.0 }));
        let uniform = SimParamsUniform::from(&params);
        assert_eq!(uniform.boundary_kind, BOUNDARY_CIRCLE);
        assert_eq!(uniform.boundary_extent, Vec2::splat(300.0));
        assert_eq!(uniform.interaction_active, 1);
        assert_eq!(uniform.interaction_strength, -10.0);
    }
}
