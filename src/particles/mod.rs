pub mod gpu_simulation;
pub mod sim_uniforms;
