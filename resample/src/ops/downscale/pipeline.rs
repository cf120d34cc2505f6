use crate::axis::{MAX_KERNEL_TAPS, MAX_SPAN_SAMPLES, TILE_SIZE};
use crate::common::{Error, Result};
use crate::gpu::Gpu;

const DOWNSCALE_SHADER: &str = include_str!("downscale.wgsl");

/// WGSL source with the tile constants taken from [`crate::axis`].
pub(super) fn shader_source() -> String {
    format!(
        "const TILE_SIZE: u32 = {}u;\nconst MAX_SPAN_SAMPLES: u32 = {}u;\nconst MAX_KERNEL_TAPS: u32 = {}u;\n\n{}",
        TILE_SIZE, MAX_SPAN_SAMPLES, MAX_KERNEL_TAPS, DOWNSCALE_SHADER
    )
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Compiled Lanczos axis-pass pipeline. Create once per device and reuse; both
/// passes of a downscale run through it with different params.
#[derive(Debug)]
pub struct GpuDownscalePipeline {
    pub(super) compute_pipeline: wgpu::ComputePipeline,
    pub(super) bind_group_layout: wgpu::BindGroupLayout,
}

impl GpuDownscalePipeline {
    pub fn new(ctx: &Gpu) -> Result<Self> {
        let device = ctx.device();

        // Shader compile errors surface through the error scope instead of the
        // device's uncaptured-error handler.
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("downscale_shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source().into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("downscale_bind_group_layout"),
            entries: &[
                // Params uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Source grid
                storage_entry(1, true),
                // Destination grid
                storage_entry(2, false),
                // Kernel taps
                storage_entry(3, true),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("downscale_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let compute_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("downscale_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        if let Some(e) = pollster::block_on(device.pop_error_scope()) {
            return Err(Error::Gpu(format!("downscale pipeline creation failed: {}", e)));
        }

        tracing::debug!(
            "downscale pipeline ready: tile {}, span cache {}, tap cache {}",
            TILE_SIZE,
            MAX_SPAN_SAMPLES,
            MAX_KERNEL_TAPS
        );

        Ok(Self {
            compute_pipeline,
            bind_group_layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::test_gpu;

    #[test]
    fn shader_source_defines_tile_constants() {
        let source = shader_source();

        assert!(source.starts_with("const TILE_SIZE: u32 = 64u;"));
        assert!(source.contains("const MAX_SPAN_SAMPLES: u32 = 2048u;"));
        assert!(source.contains("const MAX_KERNEL_TAPS: u32 = 512u;"));
        assert!(source.contains("@workgroup_size(TILE_SIZE)"));
    }

    #[test]
    fn pipeline_compiles() {
        let Some(gpu) = test_gpu() else {
            return;
        };

        GpuDownscalePipeline::new(&gpu).unwrap();
    }
}
