pub mod color;
pub mod cpu_simulation;
pub mod double_buffer;
pub mod error;
pub mod frame_driver;
pub mod grid_params;
pub mod particle;
pub mod particle_store;
pub mod sim_params;
pub mod spatial_grid_index;
pub mod verlet_integrator;
