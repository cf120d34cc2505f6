use crate::common::{Error, Result};
use crate::gpu::Gpu;
use crate::grid::PixelGrid;

/// Wrapper for read-only buffer access.
#[derive(Debug)]
pub struct ReadBuffer<'a>(pub(crate) &'a wgpu::Buffer);

impl ReadBuffer<'_> {
    /// Returns the entire buffer as a binding resource.
    pub fn as_entire_binding(&self) -> wgpu::BindingResource<'_> {
        self.0.as_entire_binding()
    }
}

/// Wrapper for writable buffer access.
#[derive(Debug)]
pub struct WriteBuffer<'a>(pub(crate) &'a wgpu::Buffer);

impl WriteBuffer<'_> {
    /// Returns the entire buffer as a binding resource.
    pub fn as_entire_binding(&self) -> wgpu::BindingResource<'_> {
        self.0.as_entire_binding()
    }

    /// Returns a reference to the underlying buffer for encoder operations.
    pub fn buffer(&self) -> &wgpu::Buffer {
        self.0
    }
}

/// Pixel grid stored in a GPU storage buffer.
///
/// Shaders address storage in 32-bit words, so four samples share a word and the
/// buffer is padded to a multiple of four bytes.
#[derive(Debug)]
pub struct GpuGrid {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl GpuGrid {
    /// Uploads a CPU grid.
    pub fn from_grid(ctx: &Gpu, grid: &PixelGrid) -> Self {
        let size = padded_size(grid.width(), grid.height());

        let buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu_grid_buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });
        {
            let mut mapped = buffer.slice(..).get_mapped_range_mut();
            mapped[..grid.pixels().len()].copy_from_slice(grid.pixels());
            mapped[grid.pixels().len()..].fill(0);
        }
        buffer.unmap();

        Self {
            buffer,
            width: grid.width(),
            height: grid.height(),
        }
    }

    /// Creates a zero-filled GPU grid.
    pub fn new_empty(ctx: &Gpu, width: u32, height: u32) -> Self {
        let buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu_grid_buffer"),
            size: padded_size(width, height),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            width,
            height,
        }
    }

    /// Downloads the grid to the CPU, blocking until the copy completes.
    pub fn to_grid(&self, ctx: &Gpu) -> Result<PixelGrid> {
        let size = self.buffer.size();

        let staging_buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu_grid_staging"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gpu_grid_download_encoder"),
            });

        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging_buffer, 0, size);
        ctx.queue().submit(std::iter::once(encoder.finish()));

        let (sender, receiver) = std::sync::mpsc::channel();
        let buffer_slice = staging_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        ctx.wait()?;

        receiver
            .recv()
            .map_err(|e| Error::Gpu(format!("map_async callback dropped: {}", e)))?
            .map_err(|e| Error::Gpu(format!("map_async failed: {}", e)))?;

        let data = buffer_slice.get_mapped_range();
        let pixels = data[..self.byte_len()].to_vec();
        drop(data);
        staging_buffer.unmap();

        PixelGrid::new_with_data(self.width, self.height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of meaningful bytes, excluding word padding.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns a read-only buffer wrapper for binding in shaders.
    pub fn read_buffer(&self) -> ReadBuffer<'_> {
        ReadBuffer(&self.buffer)
    }

    /// Returns a writable buffer wrapper for binding in shaders.
    ///
    /// Note: `&mut self` is intentional to prevent accidental writes to non-mutable buffers.
    pub fn write_buffer(&mut self) -> WriteBuffer<'_> {
        WriteBuffer(&self.buffer)
    }
}

/// Buffer size for `width * height` bytes rounded up to whole words (at least one).
fn padded_size(width: u32, height: u32) -> u64 {
    let bytes = width as u64 * height as u64;
    bytes.div_ceil(4).max(1) * 4
}
