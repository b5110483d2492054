// Not every test file will use every function.
#![allow(dead_code)]

use glam::{Vec2, Vec3};
use verlet_bins::config::SimConfig;
use verlet_bins::renderer::wgpu_context::WgpuContext;
use verlet_bins::simulation::cpu_simulation::CpuSimulation;
use verlet_bins::simulation::frame_driver::FrameDriver;
use verlet_bins::simulation::grid_params::GridParams;
use verlet_bins::simulation::particle::Particle;
use verlet_bins::simulation::particle_store::ParticleStore;
use verlet_bins::simulation::sim_params::Boundary;

pub const WHITE: Vec3 = Vec3::ONE;

// A struct to hold all the common objects for a GPU test.
pub struct TestSetup {
    pub wgpu_context: WgpuContext,
}

/// Headless GPU context, or `None` on machines without an adapter.
pub async fn setup() -> Option<TestSetup> {
    match WgpuContext::new_for_test().await {
        Ok(wgpu_context) => Some(TestSetup { wgpu_context }),
        Err(error) => {
            eprintln!("skipping GPU test, no adapter: {error}");
            None
        }
    }
}

/// 10x10 cells of 20 units with the grid's minimum corner at (-100, -100).
pub fn small_grid() -> GridParams {
    GridParams::new(20.0, 10, 10, Vec2::splat(-100.0)).unwrap()
}

pub fn store_of(positions: &[(Vec2, f32)], capacity: usize) -> ParticleStore {
    let particles: Vec<Particle> = positions
        .iter()
        .map(|&(position, radius)| Particle::new(position, WHITE, radius))
        .collect();
    ParticleStore::from_particles(&particles, capacity)
}

/// Config matching `small_grid`: no gravity, no boundary, one sub-step of a
/// 1/60 s frame.
pub fn quiet_config(capacity: usize, sub_steps: u32) -> SimConfig {
    SimConfig {
        viewport: Vec2::splat(200.0),
        capacity,
        initial_particles: 0,
        particle_radius: 3.0,
        min_cell_size: 20.0,
        sub_steps,
        max_frame_delta: 1.0 / 60.0,
        gravity: Vec2::ZERO,
        boundary: Boundary::None,
        interaction_strength: 0.0,
    }
}

pub fn cpu_driver(config: &SimConfig) -> FrameDriver<CpuSimulation> {
    let grid = config.grid_params().unwrap();
    FrameDriver::new(CpuSimulation::new(config.capacity, grid), config).unwrap()
}
