use glam::{Mat4, Vec2, Vec3};
use wgpu::util::DeviceExt;
use crate::input_manager::InputSnapshot;
use crate::utils::bind_resources::{uniform_entry, BindResources};

const ZOOM_SENSITIVITY: f32 = 0.1;
const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 20.0;

/// 2D orthographic camera over world space, y pointing down. With the
/// default position and a zoom of 1, one world unit is one pixel and the
/// world origin is the centre of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec2,
    pub zoom: f32,
}

impl Camera {
    pub fn new(position: Vec2, zoom: f32) -> Self {
        Self { position, zoom }
    }

    /// Middle-button drag pans, the wheel zooms.
    pub fn update(&mut self, input: &InputSnapshot) {
        self.position -= input.drag_delta / self.zoom;
        if input.scroll_delta != 0.0 {
            self.zoom = (self.zoom * (1.0 + ZOOM_SENSITIVITY).powf(input.scroll_delta)).clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn view_projection(&self, viewport: Vec2) -> Mat4 {
        let half = viewport / 2.0 / self.zoom;
        let projection = Mat4::orthographic_rh(-half.x, half.x, half.y, -half.y, -1.0, 1.0);
        let view = Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));
        projection * view
    }

    /// Window pixel (origin top-left) to world position.
    pub fn screen_to_world(&self, screen: Vec2, viewport: Vec2) -> Vec2 {
        (screen - viewport / 2.0) / self.zoom + self.position
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // glam::Mat4 is not guaranteed to match the WGSL mat4x4 layout.
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
        }
    }

    pub fn update_view_proj(&mut self, m: &Mat4) {
        self.view_proj = m.to_cols_array_2d();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// The camera matrix uniform buffer and its bind group.
pub struct CameraBinding {
    uniform: CameraUniform,
    buffer: wgpu::Buffer,
    bind_resources: BindResources,
}

impl CameraBinding {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = CameraUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
            label: Some("Camera Bind Group Layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Camera Bind Group"),
        });

        Self {
            uniform,
            buffer,
            bind_resources: BindResources::new(bind_group_layout, vec![bind_group]),
        }
    }

    pub fn write(&mut self, queue: &wgpu::Queue, view_projection: &Mat4) {
        self.uniform.update_view_proj(view_projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        self.bind_resources.bind_group(0)
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_resources.bind_group_layout
    }
}
