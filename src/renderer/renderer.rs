use glam::Mat4;
use crate::renderer::camera::CameraBinding;
use crate::renderer::particle_drawer::ParticleDrawer;
use crate::renderer::wgpu_context::WgpuContext;

/// Draws the latest particle buffer to the window surface.
pub struct Renderer {
    background_color: wgpu::Color,
    camera_binding: CameraBinding,
    particle_drawer: ParticleDrawer,
}

impl Renderer {
    /// `None` when the context has no surface to draw to.
    pub fn new(wgpu_context: &WgpuContext) -> Option<Self> {
        let format = wgpu_context.surface_manager()?.get_config().format;
        let device = wgpu_context.get_device();
        let camera_binding = CameraBinding::new(device);
        let particle_drawer = ParticleDrawer::new(device, format, &camera_binding);

        Some(Self {
            background_color: wgpu::Color { r: 0.1, g: 0.1, b: 0.1, a: 1.0 },
            camera_binding,
            particle_drawer,
        })
    }

    /// Renders `count` particle records of `particles` with `view_projection`.
    pub fn render(
        &mut self,
        wgpu_context: &WgpuContext,
        particles: &wgpu::Buffer,
        count: u32,
        view_projection: &Mat4,
    ) -> Result<(), wgpu::SurfaceError> {
        let Some(surface_manager) = wgpu_context.surface_manager() else {
            return Ok(());
        };
        surface_manager.get_window().request_redraw();

        // We can't render unless the window is configured
        if !surface_manager.is_surface_configured() {
            return Ok(());
        }

        self.camera_binding.write(wgpu_context.get_queue(), view_projection);

        let output = surface_manager.get_surface().get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = wgpu_context.get_device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.particle_drawer.draw(&mut render_pass, &self.camera_binding, particles, count);
        }

        wgpu_context.get_queue().submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
