use wgpu::{BindGroup, BindGroupLayout};

/// A bind group layout with the bind groups created from it, e.g. the two
/// ping-pong groups of a double-buffered resource set.
pub struct BindResources {
    pub bind_group_layout: BindGroupLayout,
    pub bind_groups: Vec<BindGroup>,
}

impl BindResources {
    pub fn new(bind_group_layout: BindGroupLayout, bind_groups: Vec<BindGroup>) -> Self {
        Self {
            bind_group_layout,
            bind_groups,
        }
    }

    pub fn bind_group(&self, index: usize) -> &BindGroup {
        &self.bind_groups[index]
    }
}

/// Layout entry for a compute-visible storage buffer.
pub fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Layout entry for a uniform buffer visible to `visibility`.
pub fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
