use crate::simulation::double_buffer::DoubleBuffer;
use crate::simulation::error::SimError;
use crate::simulation::frame_driver::SimulationBackend;
use crate::simulation::grid_params::GridParams;
use crate::simulation::particle::Particle;
use crate::simulation::particle_store::ParticleStore;
use crate::simulation::sim_params::SimParams;
use crate::simulation::spatial_grid_index::SpatialGridIndex;
use crate::simulation::verlet_integrator;

/// Host-side backend: the same phases as the compute shaders, run on the
/// rayon pool over two [`ParticleStore`]s.
pub struct CpuSimulation {
    buffers: DoubleBuffer<ParticleStore>,
    index: SpatialGridIndex,
}

impl CpuSimulation {
    pub fn new(capacity: usize, grid: GridParams) -> Self {
        Self {
            buffers: DoubleBuffer::mirrored(ParticleStore::with_capacity(capacity)),
            index: SpatialGridIndex::new(capacity, grid),
        }
    }

    /// The buffer the next sub-step reads, which is also the latest result.
    pub fn current(&self) -> &ParticleStore {
        self.buffers.current()
    }

    pub fn buffer(&self, slot: usize) -> &ParticleStore {
        self.buffers.slot(slot)
    }

    /// The bin index as of the last rebuild.
    pub fn index(&self) -> &SpatialGridIndex {
        &self.index
    }
}

impl SimulationBackend for CpuSimulation {
    fn capacity(&self) -> usize {
        self.index.capacity()
    }

    fn grid(&self) -> &GridParams {
        self.index.grid()
    }

    fn rebuild_index(&mut self) -> Result<(), SimError> {
        self.index.build(self.buffers.current())
    }

    fn integrate(&mut self, params: &SimParams) {
        let (current, next) = self.buffers.current_and_next_mut();
        verlet_integrator::integrate(current, next, &self.index, params);
    }

    fn swap(&mut self) {
        self.buffers.swap();
    }

    fn write_particle(&mut self, index: usize, particle: &Particle) {
        if !self.buffers.current_mut().set(index, *particle) {
            log::warn!("Ignoring write to slot {index} outside a pool of {}", self.capacity());
        }
    }

    fn current_slot(&self) -> usize {
        self.buffers.current_index()
    }
}
