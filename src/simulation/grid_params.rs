use glam::{UVec2, Vec2};
use crate::simulation::error::SimError;

/// Smallest cell edge the grid is built with, whatever the particle radius.
pub const MIN_CELL_SIZE: f32 = 20.0;

/// The uniform grid the simulation area is binned into.
///
/// Cells are squares of `cell_size`, numbered row-major from `origin`
/// (the grid's minimum corner): `cell = y * width + x`. Only built through
/// [`GridParams::new`], so there is always at least one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    cell_size: f32,
    width: u32,
    height: u32,
    origin: Vec2,
}

impl GridParams {
    pub fn new(cell_size: f32, width: u32, height: u32, origin: Vec2) -> Result<Self, SimError> {
        if !(cell_size > 0.0) || width == 0 || height == 0 {
            return Err(SimError::InvalidConfig(format!(
                "grid needs a positive cell size and at least one cell, got {cell_size} x ({width}, {height})"
            )));
        }
        Ok(Self { cell_size, width, height, origin })
    }

    /// Grid covering `viewport` centred on the origin, with cells large
    /// enough that any two overlapping particles of `max_radius` are at
    /// most one cell apart.
    pub fn for_viewport(viewport: Vec2, max_radius: f32, min_cell_size: f32) -> Result<Self, SimError> {
        if !(viewport.x > 0.0 && viewport.y > 0.0) {
            return Err(SimError::InvalidConfig(format!("viewport {viewport} is empty")));
        }
        let cell_size = Self::compute_cell_size(max_radius, min_cell_size);
        let width = (viewport.x / cell_size).ceil() as u32;
        let height = (viewport.y / cell_size).ceil() as u32;
        let extent = Vec2::new(width as f32, height as f32) * cell_size;
        Self::new(cell_size, width, height, -extent / 2.0)
    }

    pub fn compute_cell_size(max_radius: f32, min_cell_size: f32) -> f32 {
        min_cell_size.max(2.0 * max_radius)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Largest particle radius for which the 3x3 neighbourhood search is exact.
    pub fn max_radius(&self) -> f32 {
        self.cell_size / 2.0
    }

    /// Grid coordinates of `position`, clamped onto the grid so particles
    /// outside it land in a boundary cell instead of being dropped.
    pub fn cell_coord(&self, position: Vec2) -> UVec2 {
        let local = (position - self.origin) / self.cell_size;
        // `as` saturates, so NaN and negatives end up in column/row 0.
        let x = (local.x.floor().max(0.0) as u32).min(self.width - 1);
        let y = (local.y.floor().max(0.0) as u32).min(self.height - 1);
        UVec2::new(x, y)
    }

    pub fn cell_of(&self, position: Vec2) -> u32 {
        let coord = self.cell_coord(position);
        coord.y * self.width + coord.x
    }

    /// Minimum and maximum corner of `cell`.
    pub fn cell_bounds(&self, cell: u32) -> (Vec2, Vec2) {
        let x = (cell % self.width) as f32;
        let y = (cell / self.width) as f32;
        let min = self.origin + Vec2::new(x, y) * self.cell_size;
        (min, min + Vec2::splat(self.cell_size))
    }

    /// `cell` and its (up to) eight neighbours that exist on the grid.
    pub fn neighbourhood(&self, cell: u32) -> impl Iterator<Item = u32> + '_ {
        let cx = (cell % self.width) as i64;
        let cy = (cell / self.width) as i64;
        (-1i64..=1).flat_map(move |dy| (-1i64..=1).map(move |dx| (cx + dx, cy + dy)))
            .filter(move |&(x, y)| x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64)
            .map(move |(x, y)| y as u32 * self.width + x as u32)
    }
}
