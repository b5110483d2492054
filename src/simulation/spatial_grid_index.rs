//! Per-sub-step bucket sort of particle indices by grid cell.
//!
//! Built in three phases: count the particles of every cell, take the
//! exclusive prefix sum of the counts, then scatter each particle index to
//! a slot claimed inside its cell's range. The count and scatter phases
//! run in parallel on the rayon pool; the shared counters are `AtomicU32`
//! and slots are claimed with `fetch_add`, the same way the compute shader
//! uses `atomicAdd`. Each phase is a separate rayon call, so the join at
//! the end of a phase orders it before the next one and `Relaxed` is
//! enough for the counters.

use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};
use rayon::prelude::*;
use crate::simulation::error::SimError;
use crate::simulation::grid_params::GridParams;
use crate::simulation::particle_store::ParticleStore;

/// `bin_of` value for a free pool slot.
pub const UNUSED_BIN: u32 = u32::MAX;

pub struct SpatialGridIndex {
    grid: GridParams,
    bin_of: Vec<u32>,
    count_per_bin: Vec<AtomicU32>,
    /// Exclusive prefix sum of `count_per_bin`, with the live count appended
    /// so `prefix_sum[c]..prefix_sum[c + 1]` is always a valid range.
    prefix_sum: Vec<u32>,
    write_cursor: Vec<AtomicU32>,
    reindexed: Vec<AtomicU32>,
}

impl SpatialGridIndex {
    pub fn new(capacity: usize, grid: GridParams) -> Self {
        let cells = grid.cell_count();
        Self {
            grid,
            bin_of: vec![UNUSED_BIN; capacity],
            count_per_bin: (0..cells).map(|_| AtomicU32::new(0)).collect(),
            prefix_sum: vec![0; cells + 1],
            write_cursor: (0..cells).map(|_| AtomicU32::new(0)).collect(),
            reindexed: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.bin_of.len()
    }

    pub fn grid(&self) -> &GridParams {
        &self.grid
    }

    /// Rebuilds every structure from the positions in `store`.
    pub fn build(&mut self, store: &ParticleStore) -> Result<(), SimError> {
        if store.capacity() > self.capacity() {
            return Err(SimError::CapacityExceeded {
                particles: store.capacity(),
                capacity: self.capacity(),
            });
        }
        self.count_bins(store);
        self.scan();
        self.scatter();
        Ok(())
    }

    /// Phase 1: assign every live particle a cell and count cell occupancy.
    fn count_bins(&mut self, store: &ParticleStore) {
        self.count_per_bin.par_iter().for_each(|count| count.store(0, Ordering::Relaxed));

        let grid = &self.grid;
        let counts = &self.count_per_bin;
        let particles = store.particles();
        self.bin_of.par_iter_mut().enumerate().for_each(|(i, bin)| {
            *bin = match particles.get(i) {
                Some(particle) if particle.is_alive() => {
                    let cell = grid.cell_of(particle.position);
                    counts[cell as usize].fetch_add(1, Ordering::Relaxed);
                    cell
                }
                _ => UNUSED_BIN,
            };
        });
    }

    /// Phase 2: sequential exclusive scan; the write cursors start at each
    /// cell's base offset.
    fn scan(&mut self) {
        let mut running = 0u32;
        for (cell, count) in self.count_per_bin.iter().enumerate() {
            self.prefix_sum[cell] = running;
            self.write_cursor[cell].store(running, Ordering::Relaxed);
            running += count.load(Ordering::Relaxed);
        }
        let cells = self.count_per_bin.len();
        self.prefix_sum[cells] = running;
    }

    /// Phase 3: every live particle claims a unique slot in its cell's range.
    fn scatter(&mut self) {
        let cursors = &self.write_cursor;
        let reindexed = &self.reindexed;
        self.bin_of.par_iter().enumerate().for_each(|(i, &bin)| {
            if bin == UNUSED_BIN {
                return;
            }
            let slot = cursors[bin as usize].fetch_add(1, Ordering::Relaxed);
            reindexed[slot as usize].store(i as u32, Ordering::Relaxed);
        });
    }

    /// Cell the particle was assigned at the last build, or [`UNUSED_BIN`].
    pub fn bin_of(&self, particle: usize) -> u32 {
        self.bin_of.get(particle).copied().unwrap_or(UNUSED_BIN)
    }

    pub fn count(&self, cell: u32) -> u32 {
        self.count_per_bin[cell as usize].load(Ordering::Relaxed)
    }

    pub fn counts(&self) -> Vec<u32> {
        self.count_per_bin.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    pub fn prefix_sum(&self) -> &[u32] {
        &self.prefix_sum
    }

    pub fn live_count(&self) -> usize {
        self.prefix_sum[self.prefix_sum.len() - 1] as usize
    }

    /// Slots of `reindexed` holding the particles of `cell`.
    pub fn bin_range(&self, cell: u32) -> Range<usize> {
        let cell = cell as usize;
        self.prefix_sum[cell] as usize..self.prefix_sum[cell + 1] as usize
    }

    /// Indices of the particles binned in `cell`, in no particular order.
    pub fn particles_in_bin(&self, cell: u32) -> impl Iterator<Item = usize> + '_ {
        self.reindexed[self.bin_range(cell)].iter().map(|slot| slot.load(Ordering::Relaxed) as usize)
    }

    /// Particle indices sorted by cell; only the first `live_count()` are meaningful.
    pub fn reindexed(&self) -> Vec<u32> {
        self.reindexed[..self.live_count()].iter().map(|slot| slot.load(Ordering::Relaxed)).collect()
    }
}
