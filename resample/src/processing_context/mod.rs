mod gpu_context;
#[cfg(test)]
mod tests;

pub use gpu_context::GpuContext;

use crate::gpu::Gpu;
use crate::ops::ExecutionModel;

/// Backend session shared by every downscale run.
///
/// The CPU models need nothing from it. The GPU model borrows its device and cached
/// pipeline, and fails with `Error::NoGpuContext` when the context was built without
/// one.
#[derive(Debug)]
pub struct ProcessingContext {
    gpu_context: Option<GpuContext>,
}

impl ProcessingContext {
    /// Opens a GPU session, or logs a warning and continues CPU-only when no adapter
    /// can be used.
    pub fn new() -> Self {
        let gpu_context = match Gpu::new() {
            Ok(gpu) => Some(GpuContext::new(gpu)),
            Err(e) => {
                tracing::warn!("GPU unavailable, only CPU models will run: {}", e);
                None
            }
        };

        Self { gpu_context }
    }

    /// Context suited to running `models`: the GPU is only opened if one of them
    /// needs it.
    pub fn for_models(models: &[ExecutionModel]) -> Self {
        if models.contains(&ExecutionModel::Gpu) {
            Self::new()
        } else {
            Self::cpu_only()
        }
    }

    pub fn cpu_only() -> Self {
        Self { gpu_context: None }
    }

    pub fn with_gpu(gpu_context: GpuContext) -> Self {
        Self {
            gpu_context: Some(gpu_context),
        }
    }

    pub fn has_gpu(&self) -> bool {
        self.gpu_context.is_some()
    }

    pub fn gpu(&self) -> Option<&Gpu> {
        self.gpu_context.as_ref().map(GpuContext::gpu)
    }

    pub fn gpu_context(&mut self) -> Option<&mut GpuContext> {
        self.gpu_context.as_mut()
    }
}

impl Default for ProcessingContext {
    fn default() -> Self {
        Self::new()
    }
}
