use crate::common::Result;
use crate::gpu::Gpu;
use crate::ops::GpuDownscalePipeline;

/// GPU session plus its lazily compiled pipelines.
///
/// Pipelines are built on first use so that a CPU-only run never pays for shader
/// compilation.
#[derive(Debug)]
pub struct GpuContext {
    gpu: Gpu,
    downscale_pipeline: Option<GpuDownscalePipeline>,
}

impl GpuContext {
    pub fn new(gpu: Gpu) -> Self {
        Self {
            gpu,
            downscale_pipeline: None,
        }
    }

    /// Returns the downscale pipeline, compiling it on first call.
    pub fn downscale_pipeline(&mut self) -> Result<&GpuDownscalePipeline> {
        let pipeline = match self.downscale_pipeline.take() {
            Some(pipeline) => pipeline,
            None => GpuDownscalePipeline::new(&self.gpu)?,
        };

        Ok(&*self.downscale_pipeline.insert(pipeline))
    }

    pub fn has_downscale_pipeline(&self) -> bool {
        self.downscale_pipeline.is_some()
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }
}
