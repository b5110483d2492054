pub mod bind_resources;
pub mod compute_shader;
pub mod gpu_buffer;
pub mod render_timer;
