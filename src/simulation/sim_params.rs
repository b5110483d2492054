use glam::Vec2;

/// Region particles are kept inside of.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Boundary {
    #[default]
    None,
    Circle { center: Vec2, radius: f32 },
    Box { center: Vec2, half_extent: Vec2 },
}

/// A point the user is pulling particles toward (or pushing them away from,
/// with a negative strength).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub point: Vec2,
    pub strength: f32,
}

/// Everything one sub-step needs besides the particle state. Passed by value.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimParams {
    pub total_time: f32,
    pub delta_time: f32,
    pub boundary: Boundary,
    pub gravity: Vec2,
    pub interaction: Option<Interaction>,
}

impl SimParams {
    pub fn new(delta_time: f32) -> Self {
        Self { delta_time, ..Self::default() }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_interaction(mut self, interaction: Option<Interaction>) -> Self {
        self.interaction = interaction;
        self
    }
}
