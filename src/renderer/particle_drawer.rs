use glam::Vec2;
use crate::renderer::camera::CameraBinding;
use crate::simulation::particle::{Particle, PARTICLE_SIZE};
use crate::utils::gpu_buffer::GpuBuffer;

/// Draws one disc per particle record, reading the particle storage buffer
/// directly as its instance buffer.
pub struct ParticleDrawer {
    render_pipeline: wgpu::RenderPipeline,
    vertices: GpuBuffer<Vec2>,
    indices: GpuBuffer<u32>,
}

impl ParticleDrawer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, camera: &CameraBinding) -> Self {
        let shader = device.create_shader_module(wgpu::include_wgsl!("particle_drawer.wgsl"));
        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Render Pipeline Layout"),
            bind_group_layouts: &[camera.bind_group_layout()],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: size_of::<Vec2>() as wgpu::BufferAddress,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                    },
                    Self::instance_layout(),
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // The y-down projection flips winding.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let vertices = GpuBuffer::new(
            device,
            "Particle quad vertices",
            vec![
                Vec2::new(-0.5, 0.5),
                Vec2::new(0.5, 0.5),
                Vec2::new(0.5, -0.5),
                Vec2::new(-0.5, -0.5),
            ],
            wgpu::BufferUsages::VERTEX,
        );
        let indices = GpuBuffer::new(device, "Particle quad indices", vec![0, 3, 2, 2, 1, 0], wgpu::BufferUsages::INDEX);

        Self {
            render_pipeline,
            vertices,
            indices,
        }
    }

    /// Position, alive flag, colour and radius straight out of the 64-byte record.
    fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
            wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x2, offset: 0, shader_location: 1 },
            wgpu::VertexAttribute { format: wgpu::VertexFormat::Uint32, offset: 44, shader_location: 2 },
            wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x3, offset: 48, shader_location: 3 },
            wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32, offset: 60, shader_location: 4 },
        ];
        wgpu::VertexBufferLayout {
            array_stride: PARTICLE_SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }

    /// Draws the first `count` records of `particles`.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass, camera: &CameraBinding, particles: &wgpu::Buffer, count: u32) {
        debug_assert!(particles.size() >= count as u64 * size_of::<Particle>() as u64);
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, camera.bind_group(), &[]);
        render_pass.set_vertex_buffer(0, self.vertices.buffer().slice(..));
        render_pass.set_vertex_buffer(1, particles.slice(..));
        render_pass.set_index_buffer(self.indices.buffer().slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.indices.len() as u32, 0, 0..count);
    }
}
