mod gpu_grid;

use std::sync::Arc;

use wgpu::util::DeviceExt;

pub use self::gpu_grid::{GpuGrid, ReadBuffer, WriteBuffer};

use crate::common::{Error, Result};

/// GPU session holding the wgpu device and queue.
///
/// Every device resource created through it is released when its owner is dropped;
/// the device itself goes away with the last clone of the session.
#[derive(Debug, Clone)]
pub struct Gpu {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl Gpu {
    /// Creates a new GPU session on the highest-performance adapter.
    pub fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| Error::Gpu(format!("request_adapter failed: {}", e)))?;

        let info = adapter.get_info();
        tracing::debug!(
            "GPU adapter: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
                label: Some("resample_device"),
                ..Default::default()
            }))
            .map_err(|e| Error::Gpu(format!("request_device failed: {}", e)))?;

        let limits = device.limits();
        tracing::debug!(
            "max workgroup size: {}, workgroup storage: {} bytes",
            limits.max_compute_invocations_per_workgroup,
            limits.max_compute_workgroup_storage_size
        );

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Returns a reference to the wgpu device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the wgpu queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Blocks until all submitted work has finished.
    pub fn wait(&self) -> Result<()> {
        self.device
            .poll(wgpu::PollType::Wait)
            .map(|_| ())
            .map_err(|e| Error::Gpu(format!("device poll failed: {}", e)))
    }

    /// Creates a read-only storage buffer initialized with `contents`.
    pub fn create_storage_buffer<T: bytemuck::Pod>(
        &self,
        label: &str,
        contents: &[T],
    ) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(contents),
                usage: wgpu::BufferUsages::STORAGE,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_context_creation() {
        let result = Gpu::new();
        if let Err(e) = &result {
            eprintln!(
                "GPU context creation failed (expected on headless systems): {}",
                e
            );
            assert!(e.is_backend_unavailable());
            return;
        }

        let gpu = result.unwrap();
        gpu.wait().unwrap();
    }
}
