use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::pipeline::GpuDownscalePipeline;
use crate::axis::{Axis, TileSpan};
use crate::common::{Error, Result};
use crate::gpu::{Gpu, GpuGrid};
use crate::grid::PixelGrid;
use crate::kernel::LanczosKernel;

/// Largest input side whose coordinate math stays within the shader's 32-bit integers.
pub(super) const MAX_GPU_SIDE: u32 = 32768;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct Params {
    in_width: u32,
    in_height: u32,
    out_width: u32,
    out_height: u32,
    // Unit step along the filtered axis
    dx: u32,
    dy: u32,
    half_kernel_size: u32,
    _padding: u32,
}

/// Records one axis pass from `input` into `output`.
///
/// Output bytes are OR-ed into their words, so the destination is cleared first.
#[allow(clippy::too_many_arguments)]
fn encode_pass(
    ctx: &Gpu,
    pipeline: &GpuDownscalePipeline,
    encoder: &mut wgpu::CommandEncoder,
    kernel_taps: &wgpu::Buffer,
    half_kernel_size: u32,
    input: &GpuGrid,
    output: &mut GpuGrid,
    axis: Axis,
) {
    let device = ctx.device();
    let (dx, dy) = axis.step();

    let params = Params {
        in_width: input.width(),
        in_height: input.height(),
        out_width: output.width(),
        out_height: output.height(),
        dx,
        dy,
        half_kernel_size,
        _padding: 0,
    };

    let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("downscale_params_buffer"),
        contents: bytemuck::bytes_of(&params),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    encoder.clear_buffer(output.write_buffer().buffer(), 0, None);

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("downscale_bind_group"),
        layout: &pipeline.bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: input.read_buffer().as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: output.write_buffer().as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: kernel_taps.as_entire_binding(),
            },
        ],
    });

    let out_len = axis.len(output.width(), output.height());
    let tiles = TileSpan::tile_count(out_len);
    let lines = axis.line_count(output.width(), output.height());

    tracing::debug!(
        "{:?} pass {}x{} -> {}x{}: {} x {} work-groups",
        axis,
        input.width(),
        input.height(),
        output.width(),
        output.height(),
        tiles,
        lines
    );

    let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
        label: Some("downscale_pass"),
        timestamp_writes: None,
    });
    pass.set_pipeline(&pipeline.compute_pipeline);
    pass.set_bind_group(0, &bind_group, &[]);
    pass.dispatch_workgroups(tiles, lines, 1);
}

/// Downscales a square grid to `output_side` with both passes in one submission,
/// then reads the result back.
pub(super) fn downscale(
    ctx: &Gpu,
    pipeline: &GpuDownscalePipeline,
    input: &PixelGrid,
    output_side: u32,
    kernel: &LanczosKernel,
) -> Result<PixelGrid> {
    let input_side = input.side()?;
    if input_side > MAX_GPU_SIDE {
        return Err(Error::InvalidDimensions(format!(
            "input side {} exceeds the GPU limit of {}",
            input_side, MAX_GPU_SIDE
        )));
    }

    let binding_limit = ctx.device().limits().max_storage_buffer_binding_size as u64;
    let input_bytes = input.pixels().len() as u64;
    if input_bytes > binding_limit {
        return Err(Error::InvalidDimensions(format!(
            "input of {} bytes exceeds the device's storage binding limit of {} bytes",
            input_bytes, binding_limit
        )));
    }

    let source = GpuGrid::from_grid(ctx, input);
    let mut intermediate = GpuGrid::new_empty(ctx, input_side, output_side);
    let mut destination = GpuGrid::new_empty(ctx, output_side, output_side);
    let kernel_taps = ctx.create_storage_buffer("downscale_kernel_taps", kernel.taps());

    let mut encoder = ctx
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("downscale_encoder"),
        });

    encode_pass(
        ctx,
        pipeline,
        &mut encoder,
        &kernel_taps,
        kernel.half_size(),
        &source,
        &mut intermediate,
        Axis::Vertical,
    );
    encode_pass(
        ctx,
        pipeline,
        &mut encoder,
        &kernel_taps,
        kernel.half_size(),
        &intermediate,
        &mut destination,
        Axis::Horizontal,
    );

    ctx.queue().submit(std::iter::once(encoder.finish()));

    destination.to_grid(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::max_pixel_diff;
    use crate::common::test_utils::{random_grid, test_gpu};
    use crate::ops::downscale::cpu;

    fn run_pass(
        ctx: &Gpu,
        pipeline: &GpuDownscalePipeline,
        input: &PixelGrid,
        width: u32,
        height: u32,
        axis: Axis,
        kernel: &LanczosKernel,
    ) -> PixelGrid {
        let source = GpuGrid::from_grid(ctx, input);
        let mut output = GpuGrid::new_empty(ctx, width, height);
        let taps = ctx.create_storage_buffer("test_taps", kernel.taps());

        let mut encoder = ctx
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        encode_pass(
            ctx,
            pipeline,
            &mut encoder,
            &taps,
            kernel.half_size(),
            &source,
            &mut output,
            axis,
        );
        ctx.queue().submit(std::iter::once(encoder.finish()));

        output.to_grid(ctx).unwrap()
    }

    #[test]
    fn params_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<Params>(), 32);
    }

    #[test]
    fn test_single_pass_matches_cpu_on_both_axes() {
        let Some(ctx) = test_gpu() else {
            return;
        };
        let pipeline = GpuDownscalePipeline::new(&ctx).unwrap();

        // Odd widths exercise bytes that share a word across rows.
        let input = random_grid(201, 130, 5);
        let kernel = LanczosKernel::with_factor(2);

        let mut expected = PixelGrid::new_empty(201, 65);
        cpu::filter_axis(&input, &mut expected, Axis::Vertical, &kernel);
        let actual = run_pass(&ctx, &pipeline, &input, 201, 65, Axis::Vertical, &kernel);
        assert!(max_pixel_diff(&actual, &expected) <= 1);

        let input = random_grid(130, 201, 6);
        let mut expected = PixelGrid::new_empty(65, 201);
        cpu::filter_axis(&input, &mut expected, Axis::Horizontal, &kernel);
        let actual = run_pass(&ctx, &pipeline, &input, 65, 201, Axis::Horizontal, &kernel);
        assert!(max_pixel_diff(&actual, &expected) <= 1);
    }

    #[test]
    fn test_reused_destination_is_cleared() {
        let Some(ctx) = test_gpu() else {
            return;
        };
        let pipeline = GpuDownscalePipeline::new(&ctx).unwrap();
        let kernel = LanczosKernel::with_factor(2);
        let taps = ctx.create_storage_buffer("test_taps", kernel.taps());

        let bright = GpuGrid::from_grid(&ctx, &PixelGrid::filled(16, 16, 255));
        let dark = GpuGrid::from_grid(&ctx, &PixelGrid::filled(16, 16, 10));
        let mut output = GpuGrid::new_empty(&ctx, 16, 8);

        for input in [&bright, &dark] {
            let mut encoder = ctx
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
            encode_pass(
                &ctx,
                &pipeline,
                &mut encoder,
                &taps,
                kernel.half_size(),
                input,
                &mut output,
                Axis::Vertical,
            );
            ctx.queue().submit(std::iter::once(encoder.finish()));
        }

        let result = output.to_grid(&ctx).unwrap();
        assert!(result.pixels().iter().all(|&p| p == 10));
    }
}
