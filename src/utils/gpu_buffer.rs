use wgpu::util::DeviceExt;
use wgpu::Buffer;

/// A fixed-size GPU buffer of `T` with a host-side mirror of its contents.
///
/// The mirror is only as fresh as the last [`GpuBuffer::write`] or
/// [`GpuBuffer::download`]; kernels that write the buffer do not touch it.
#[derive(Debug)]
pub struct GpuBuffer<T> {
    data: Vec<T>,
    buffer: wgpu::Buffer,
}

impl<T: bytemuck::Pod> GpuBuffer<T> {
    pub fn new(device: &wgpu::Device, label: &str, data: Vec<T>, usage: wgpu::BufferUsages) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data),
            usage,
        });
        Self { data, buffer }
    }

    /// `len` zeroed elements.
    pub fn zeroed(device: &wgpu::Device, label: &str, len: usize, usage: wgpu::BufferUsages) -> Self {
        Self::new(device, label, vec![T::zeroed(); len], usage)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Overwrites element `index` on both sides. The upload is queued and
    /// lands before the next submission.
    pub fn write(&mut self, queue: &wgpu::Queue, index: usize, value: T) -> bool {
        let Some(slot) = self.data.get_mut(index) else {
            return false;
        };
        *slot = value;
        queue.write_buffer(
            &self.buffer,
            (index * size_of::<T>()) as u64,
            bytemuck::bytes_of(&value),
        );
        true
    }

    /// Reads the buffer back into the host mirror, blocking until the GPU is done.
    pub fn download(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> anyhow::Result<&[T]> {
        if self.is_empty() {
            return Ok(&self.data);
        }
        let size = (self.data.len() * size_of::<T>()) as u64;

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Staging Buffer (Download)"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Download Encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging_buffer, 0, size);
        queue.submit(Some(encoder.finish()));

        let buffer_slice = staging_buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            // The receiver outlives the poll below.
            let _ = sender.send(result);
        });
        device.poll(wgpu::PollType::Wait)?;
        receiver.recv()??;

        {
            let mapped_range = buffer_slice.get_mapped_range();
            self.data.copy_from_slice(bytemuck::cast_slice(&mapped_range));
        }
        staging_buffer.unmap();

        Ok(&self.data)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }
}
