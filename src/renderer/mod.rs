pub mod camera;
pub mod particle_drawer;
pub mod renderer;
pub mod surface_manager;
pub mod wgpu_context;
