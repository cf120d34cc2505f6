mod cpu;
mod gpu;
mod pipeline;
mod tiled;

use crate::axis::{self, Axis};
use crate::common::{Error, Result};
use crate::gpu::Gpu;
use crate::grid::PixelGrid;
use crate::instrument::Timed;
use crate::kernel::LanczosKernel;
use crate::ops::ExecutionModel;
use crate::processing_context::ProcessingContext;

pub use pipeline::GpuDownscalePipeline;

type AxisFilter = fn(&PixelGrid, &mut PixelGrid, Axis, &LanczosKernel);

/// Separable Lanczos-3 downscale of a square grid to `output_side`.
///
/// Every execution model runs the vertical pass first, from the source into an
/// intermediate `input_side x output_side` grid, then the horizontal pass into the
/// square destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Downscale {
    pub output_side: u32,
}

impl Downscale {
    pub fn new(output_side: u32) -> Self {
        Self { output_side }
    }

    /// Checks `input` against this downscale for `model` and builds the kernel.
    ///
    /// # Errors
    /// `InvalidDimensions` if the input is not square, the output side is not a
    /// strict integer divisor of the input side, or the factor exceeds
    /// [`axis::max_tiled_factor`] on a tiled model.
    pub fn kernel_for(&self, input: &PixelGrid, model: ExecutionModel) -> Result<LanczosKernel> {
        let input_side = input.side()?;
        if self.output_side >= input_side {
            return Err(Error::InvalidDimensions(format!(
                "output side {} must be smaller than input side {}",
                self.output_side, input_side
            )));
        }

        let kernel = LanczosKernel::new(input_side, self.output_side)?;
        if model.is_data_parallel() {
            axis::check_tiled_factor(kernel.factor())?;
        }

        Ok(kernel)
    }

    /// Single-threaded reference implementation.
    pub fn apply_cpu(&self, input: &PixelGrid) -> Result<PixelGrid> {
        let kernel = self.kernel_for(input, ExecutionModel::Sequential)?;
        Ok(self.two_pass(input, &kernel, cpu::filter_axis))
    }

    /// Work-group protocol on the rayon thread pool; output is identical to
    /// [`Downscale::apply_cpu`].
    pub fn apply_tiled(&self, input: &PixelGrid) -> Result<PixelGrid> {
        let kernel = self.kernel_for(input, ExecutionModel::Tiled)?;
        Ok(self.two_pass(input, &kernel, tiled::filter_axis))
    }

    /// Runs both passes on the GPU, including upload and read-back.
    pub fn apply_gpu(
        &self,
        ctx: &Gpu,
        pipeline: &GpuDownscalePipeline,
        input: &PixelGrid,
    ) -> Result<PixelGrid> {
        let kernel = self.kernel_for(input, ExecutionModel::Gpu)?;
        gpu::downscale(ctx, pipeline, input, self.output_side, &kernel)
    }

    /// Runs the downscale with the given execution model.
    ///
    /// # Errors
    /// `NoGpuContext` if `model` is [`ExecutionModel::Gpu`] and `ctx` is CPU-only.
    pub fn execute(
        &self,
        ctx: &mut ProcessingContext,
        model: ExecutionModel,
        input: &PixelGrid,
    ) -> Result<PixelGrid> {
        match model {
            ExecutionModel::Sequential => self.apply_cpu(input),
            ExecutionModel::Tiled => self.apply_tiled(input),
            ExecutionModel::Gpu => {
                let gpu_ctx = ctx.gpu_context().ok_or(Error::NoGpuContext)?;
                let gpu = gpu_ctx.gpu().clone();
                let pipeline = gpu_ctx.downscale_pipeline()?;

                self.apply_gpu(&gpu, pipeline, input)
            }
        }
    }

    /// [`Downscale::execute`] under a stopwatch labelled with the model.
    ///
    /// The GPU pipeline is built before the timer starts; upload, both dispatches and
    /// read-back are inside it.
    pub fn execute_timed(
        &self,
        ctx: &mut ProcessingContext,
        model: ExecutionModel,
        input: &PixelGrid,
    ) -> Result<Timed<PixelGrid>> {
        match model {
            ExecutionModel::Gpu => {
                let gpu_ctx = ctx.gpu_context().ok_or(Error::NoGpuContext)?;
                let gpu = gpu_ctx.gpu().clone();
                let pipeline = gpu_ctx.downscale_pipeline()?;

                Timed::measure(model.label(), || self.apply_gpu(&gpu, pipeline, input))
            }
            _ => Timed::measure(model.label(), || self.execute(ctx, model, input)),
        }
    }

    fn two_pass(&self, input: &PixelGrid, kernel: &LanczosKernel, filter: AxisFilter) -> PixelGrid {
        let mut intermediate = PixelGrid::new_empty(input.width(), self.output_side);
        filter(input, &mut intermediate, Axis::Vertical, kernel);

        let mut output = PixelGrid::new_empty(self.output_side, self.output_side);
        filter(&intermediate, &mut output, Axis::Horizontal, kernel);

        output
    }
}
