use wgpu::{BindGroupLayout, CommandEncoder};
use wgpu_profiler::{GpuProfiler, GpuProfilerSettings};
use crate::particles::sim_uniforms::{BinParamsUniform, SimParamsUniform};
use crate::renderer::wgpu_context::WgpuContext;
use crate::simulation::error::SimError;
use crate::simulation::frame_driver::SimulationBackend;
use crate::simulation::grid_params::GridParams;
use crate::simulation::particle::Particle;
use crate::simulation::sim_params::SimParams;
use crate::utils::bind_resources::{storage_entry, uniform_entry, BindResources};
use crate::utils::compute_shader::ComputeShader;
use crate::utils::gpu_buffer::GpuBuffer;

const WORKGROUP_SIZE: u32 = 64;
const SIM_PARAMS_SIZE: u64 = size_of::<SimParamsUniform>() as u64;

/// The bin index as read back from the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct BinIndexSnapshot {
    pub bin_of: Vec<u32>,
    pub counts: Vec<u32>,
    pub prefix_sum: Vec<u32>,
    pub reindexed: Vec<u32>,
}

/// GPU-resident backend: two particle storage buffers in ping-pong, the bin
/// index buffers and the four compute phases.
///
/// A frame's sub-steps are recorded into one encoder and submitted from
/// [`SimulationBackend::end_frame`]. Each sub-step gets its own params
/// record: they are queued into a staging buffer and copied into the
/// uniform right before the sub-step's integrate pass.
pub struct GpuSimulation {
    device: wgpu::Device,
    queue: wgpu::Queue,
    grid: GridParams,
    capacity: usize,

    particles: [GpuBuffer<Particle>; 2],
    current: usize,
    bin_of: GpuBuffer<u32>,
    bin_counts: GpuBuffer<u32>,
    bin_prefix_sum: GpuBuffer<u32>,
    bin_cursor: GpuBuffer<u32>,
    bin_reindex: GpuBuffer<u32>,

    sim_params: wgpu::Buffer,
    bin_params: GpuBuffer<BinParamsUniform>,
    params_staging: wgpu::Buffer,
    staging_slots: usize,
    pending_params: Vec<SimParamsUniform>,

    params_bind_resources: BindResources,
    particle_bind_resources: BindResources,
    count_bins: ComputeShader,
    prefix_sum_bins: ComputeShader,
    scatter_bins: ComputeShader,
    integrate: ComputeShader,

    encoder: Option<CommandEncoder>,
    gpu_profiler: GpuProfiler,
}

impl GpuSimulation {
    /// Allocates every buffer for `capacity` particles on `grid`.
    /// `sub_steps` sizes the per-frame params staging buffer.
    pub fn new(wgpu_context: &WgpuContext, capacity: usize, grid: GridParams, sub_steps: u32) -> anyhow::Result<Self> {
        if capacity == 0 || capacity > u32::MAX as usize {
            return Err(SimError::InvalidConfig(format!("unsupported particle capacity {capacity}")).into());
        }
        let device = wgpu_context.get_device().clone();
        let queue = wgpu_context.get_queue().clone();
        let cell_count = grid.cell_count();

        let particle_usage = wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX;
        let particles = [
            GpuBuffer::new(&device, "Particles A", vec![Particle::free(); capacity], particle_usage),
            GpuBuffer::new(&device, "Particles B", vec![Particle::free(); capacity], particle_usage),
        ];
        let storage = wgpu::BufferUsages::STORAGE;
        let bin_of = GpuBuffer::zeroed(&device, "Bin of", capacity, storage);
        let bin_counts = GpuBuffer::zeroed(&device, "Bin counts", cell_count, storage);
        let bin_prefix_sum = GpuBuffer::zeroed(&device, "Bin prefix sum", cell_count + 1, storage);
        let bin_cursor = GpuBuffer::zeroed(&device, "Bin cursor", cell_count, storage);
        let bin_reindex = GpuBuffer::zeroed(&device, "Bin reindex", capacity, storage);

        let sim_params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sim params"),
            size: SIM_PARAMS_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let staging_slots = sub_steps.max(1) as usize;
        let params_staging = Self::create_params_staging(&device, staging_slots);
        let bin_params = GpuBuffer::new(
            &device,
            "Bin params",
            vec![BinParamsUniform::new(&grid, capacity as u32)],
            wgpu::BufferUsages::UNIFORM,
        );

        let params_bind_resources = Self::create_params_bind_resources(&device, &sim_params, bin_params.buffer());
        let particle_bind_resources = Self::create_particle_bind_resources(
            &device,
            &particles,
            [&bin_of, &bin_counts, &bin_prefix_sum, &bin_cursor, &bin_reindex],
        );

        let module = device.create_shader_module(wgpu::include_wgsl!("simulation.wgsl"));
        let layouts = [
            &params_bind_resources.bind_group_layout,
            &particle_bind_resources.bind_group_layout,
        ];
        let count_bins = ComputeShader::new(&device, &module, "count_bins", &layouts, WORKGROUP_SIZE);
        let prefix_sum_bins = ComputeShader::new(&device, &module, "prefix_sum_bins", &layouts, WORKGROUP_SIZE);
        let scatter_bins = ComputeShader::new(&device, &module, "scatter_bins", &layouts, WORKGROUP_SIZE);
        let integrate = ComputeShader::new(&device, &module, "integrate", &layouts, WORKGROUP_SIZE);

        let gpu_profiler = GpuProfiler::new(&device, GpuProfilerSettings::default())?;

        log::info!(
            "GPU simulation ready: {capacity} particle slots, {}x{} cells of {} px",
            grid.width(),
            grid.height(),
            grid.cell_size()
        );

        Ok(Self {
            device,
            queue,
            grid,
            capacity,
            particles,
            current: 0,
            bin_of,
            bin_counts,
            bin_prefix_sum,
            bin_cursor,
            bin_reindex,
            sim_params,
            bin_params,
            params_staging,
            staging_slots,
            pending_params: Vec::with_capacity(staging_slots),
            params_bind_resources,
            particle_bind_resources,
            count_bins,
            prefix_sum_bins,
            scatter_bins,
            integrate,
            encoder: None,
            gpu_profiler,
        })
    }

    fn create_params_staging(device: &wgpu::Device, slots: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sim params staging"),
            size: SIM_PARAMS_SIZE * slots as u64,
            usage: wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_params_bind_resources(device: &wgpu::Device, sim_params: &wgpu::Buffer, bin_params: &wgpu::Buffer) -> BindResources {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Simulation params layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::COMPUTE),
                uniform_entry(1, wgpu::ShaderStages::COMPUTE),
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Simulation params"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: sim_params.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: bin_params.as_entire_binding() },
            ],
        });
        BindResources::new(bind_group_layout, vec![bind_group])
    }

    /// Bind group `k` reads particle buffer `k` and writes buffer `k ^ 1`.
    fn create_particle_bind_resources(
        device: &wgpu::Device,
        particles: &[GpuBuffer<Particle>; 2],
        bins: [&GpuBuffer<u32>; 5],
    ) -> BindResources {
        let bind_group_layout: BindGroupLayout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle bins layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, false),
                storage_entry(2, false),
                storage_entry(3, false),
                storage_entry(4, false),
                storage_entry(5, false),
                storage_entry(6, false),
            ],
        });

        let bind_groups = (0..2)
            .map(|source| {
                let mut entries = vec![
                    wgpu::BindGroupEntry { binding: 0, resource: particles[source].buffer().as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 1, resource: particles[source ^ 1].buffer().as_entire_binding() },
                ];
                entries.extend(bins.iter().enumerate().map(|(offset, buffer)| wgpu::BindGroupEntry {
                    binding: 2 + offset as u32,
                    resource: buffer.buffer().as_entire_binding(),
                }));
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(if source == 0 { "Particle bins A -> B" } else { "Particle bins B -> A" }),
                    layout: &bind_group_layout,
                    entries: &entries,
                })
            })
            .collect();

        BindResources::new(bind_group_layout, bind_groups)
    }

    fn encoder(&mut self) -> &mut CommandEncoder {
        let device = &self.device;
        self.encoder.get_or_insert_with(|| {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Simulation Encoder") })
        })
    }

    /// Uploads the queued params records and submits everything recorded so far.
    fn flush(&mut self) {
        let Some(mut encoder) = self.encoder.take() else {
            return;
        };
        if !self.pending_params.is_empty() {
            self.queue.write_buffer(&self.params_staging, 0, bytemuck::cast_slice(&self.pending_params));
            self.pending_params.clear();
        }
        self.gpu_profiler.resolve_queries(&mut encoder);
        self.queue.submit(Some(encoder.finish()));
    }

    /// The particle buffer the next sub-step reads, which also holds the
    /// latest result. Bound as the renderer's instance buffer.
    pub fn current_particle_buffer(&self) -> &wgpu::Buffer {
        self.particles[self.current].buffer()
    }

    pub fn bin_params(&self) -> &BinParamsUniform {
        &self.bin_params.data()[0]
    }

    /// Blocking readback of the current particle buffer.
    pub fn download_particles(&mut self) -> anyhow::Result<Vec<Particle>> {
        self.flush();
        Ok(self.particles[self.current].download(&self.device, &self.queue)?.to_vec())
    }

    /// Blocking readback of the bin index from the last rebuild.
    pub fn download_bin_index(&mut self) -> anyhow::Result<BinIndexSnapshot> {
        self.flush();
        let device = &self.device;
        let queue = &self.queue;
        let prefix_sum = self.bin_prefix_sum.download(device, queue)?.to_vec();
        let live = prefix_sum.last().copied().unwrap_or(0) as usize;
        Ok(BinIndexSnapshot {
            bin_of: self.bin_of.download(device, queue)?.to_vec(),
            counts: self.bin_counts.download(device, queue)?.to_vec(),
            reindexed: self.bin_reindex.download(device, queue)?[..live].to_vec(),
            prefix_sum,
        })
    }
}

impl SimulationBackend for GpuSimulation {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn grid(&self) -> &GridParams {
        &self.grid
    }

    fn begin_frame(&mut self) {
        self.flush();
        self.encoder();
    }

    fn rebuild_index(&mut self) -> Result<(), SimError> {
        let items = self.capacity as u32;
        let bind_groups = [
            self.params_bind_resources.bind_group(0),
            self.particle_bind_resources.bind_group(self.current),
        ];
        let encoder = self.encoder.get_or_insert_with(|| {
            self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Simulation Encoder") })
        });
        encoder.clear_buffer(self.bin_counts.buffer(), 0, None);
        {
            let mut scope = self.gpu_profiler.scope("Count bins", encoder);
            self.count_bins.dispatch_by_items(&mut scope, items, &bind_groups);
        }
        {
            let mut scope = self.gpu_profiler.scope("Prefix sum bins", encoder);
            self.prefix_sum_bins.dispatch(&mut scope, 1, &bind_groups);
        }
        {
            let mut scope = self.gpu_profiler.scope("Scatter bins", encoder);
            self.scatter_bins.dispatch_by_items(&mut scope, items, &bind_groups);
        }
        Ok(())
    }

    fn integrate(&mut self, params: &SimParams) {
        if self.pending_params.len() == self.staging_slots {
            // More sub-steps than staging slots: submit what we have first.
            self.flush();
        }
        let slot = self.pending_params.len() as u64;
        self.pending_params.push(SimParamsUniform::from(params));

        let items = self.capacity as u32;
        let bind_groups = [
            self.params_bind_resources.bind_group(0),
            self.particle_bind_resources.bind_group(self.current),
        ];
        let encoder = self.encoder.get_or_insert_with(|| {
            self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Simulation Encoder") })
        });
        encoder.copy_buffer_to_buffer(&self.params_staging, slot * SIM_PARAMS_SIZE, &self.sim_params, 0, SIM_PARAMS_SIZE);
        let mut scope = self.gpu_profiler.scope("Integrate", encoder);
        self.integrate.dispatch_by_items(&mut scope, items, &bind_groups);
    }

    fn swap(&mut self) {
        self.current ^= 1;
    }

    fn end_frame(&mut self) {
        self.flush();
        if let Err(error) = self.gpu_profiler.end_frame() {
            log::warn!("GPU profiler frame not closed: {error}");
        }
        if let Some(results) = self.gpu_profiler.process_finished_frame(self.queue.get_timestamp_period()) {
            for result in results {
                if let Some(time) = result.time {
                    log::trace!("{}: {:.3} ms", result.label, (time.end - time.start) * 1000.0);
                }
            }
        }
    }

    fn write_particle(&mut self, index: usize, particle: &Particle) {
        if !self.particles[self.current].write(&self.queue, index, *particle) {
            log::warn!("Ignoring write to slot {index} outside a pool of {}", self.capacity);
        }
    }

    fn current_slot(&self) -> usize {
        self.current
    }
}
