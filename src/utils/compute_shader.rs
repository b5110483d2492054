use wgpu::{BindGroup, CommandEncoder};

/// One compute entry point with its pipeline and 1D workgroup size.
pub struct ComputeShader {
    pipeline: wgpu::ComputePipeline,
    label: String,
    workgroup_size: u32,
}

impl ComputeShader {
    pub fn new(
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        entry_point: &str,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        workgroup_size: u32,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("Compute Pipeline Layout for {}", entry_point)),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&format!("Compute Pipeline for {}", entry_point)),
            layout: Some(&pipeline_layout),
            module,
            entry_point: Some(entry_point),
            compilation_options: wgpu::PipelineCompilationOptions {
                constants: &[("WORKGROUP_SIZE", workgroup_size as f64)],
                zero_initialize_workgroup_memory: true,
            },
            cache: None,
        });

        Self {
            pipeline,
            label: entry_point.to_string(),
            workgroup_size,
        }
    }

    /// Records one compute pass of `workgroups` workgroups. Bind group `i`
    /// of `bind_groups` is bound at group index `i`.
    pub fn dispatch(&self, encoder: &mut CommandEncoder, workgroups: u32, bind_groups: &[&BindGroup]) {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(&self.label),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&self.pipeline);
        for (index, bind_group) in bind_groups.iter().enumerate() {
            compute_pass.set_bind_group(index as u32, *bind_group, &[]);
        }
        compute_pass.dispatch_workgroups(workgroups, 1, 1);
    }

    /// Enough workgroups to give every one of `item_count` items an invocation.
    pub fn dispatch_by_items(&self, encoder: &mut CommandEncoder, item_count: u32, bind_groups: &[&BindGroup]) {
        let workgroups = item_count.div_ceil(self.workgroup_size).max(1);
        self.dispatch(encoder, workgroups, bind_groups);
    }
}
