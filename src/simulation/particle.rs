use glam::{Vec2, Vec3};

/// One particle record, laid out as four `vec4<f32>` so the same bytes can
/// be bound as a storage buffer in the compute shaders and as an instance
/// vertex buffer in the drawer.
///
/// ```text
///  0..16   position.xy      | pad
/// 16..32   previous.xy      | pad
/// 32..48   acceleration.xy  | pad | alive
/// 48..64   color.rgb        | radius
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    pub position: Vec2,
    _pad0: Vec2,
    pub previous_position: Vec2,
    _pad1: Vec2,
    pub acceleration: Vec2,
    _pad2: f32,
    alive: u32,
    pub color: Vec3,
    pub radius: f32,
}

/// Byte size of a particle record on both sides of the bus.
pub const PARTICLE_SIZE: usize = size_of::<Particle>();

impl Particle {
    /// A live particle at rest at `position`.
    pub fn new(position: Vec2, color: Vec3, radius: f32) -> Self {
        Self {
            position,
            previous_position: position,
            color,
            radius,
            alive: 1,
            ..Self::default()
        }
    }

    /// A live particle whose implicit velocity is `velocity` per sub-step.
    pub fn with_velocity(position: Vec2, velocity: Vec2, color: Vec3, radius: f32) -> Self {
        Self {
            previous_position: position - velocity,
            ..Self::new(position, color, radius)
        }
    }

    /// An unoccupied pool slot.
    pub fn free() -> Self {
        Self::default()
    }

    pub fn is_alive(&self) -> bool {
        self.alive != 0
    }

    /// Displacement over the last sub-step (position Verlet keeps no velocity).
    pub fn velocity(&self) -> Vec2 {
        self.position - self.previous_position
    }
}
