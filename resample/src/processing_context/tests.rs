use super::*;
use crate::common::test_utils::{synthetic_scene, test_gpu};
use crate::ops::{Downscale, ExecutionModel, GpuDownscalePipeline};

#[test]
fn cpu_only_context_has_no_gpu() {
    let mut ctx = ProcessingContext::cpu_only();

    assert!(!ctx.has_gpu());
    assert!(ctx.gpu().is_none());
    assert!(ctx.gpu_context().is_none());
}

#[test]
fn cpu_models_do_not_open_the_gpu() {
    let ctx = ProcessingContext::for_models(&[ExecutionModel::Sequential, ExecutionModel::Tiled]);
    assert!(!ctx.has_gpu());
}

#[test]
fn pipeline_is_built_once_and_reused() {
    let Some(gpu) = test_gpu() else {
        return;
    };
    let mut ctx = ProcessingContext::with_gpu(GpuContext::new(gpu));

    let gpu_ctx = ctx.gpu_context().unwrap();
    assert!(!gpu_ctx.has_downscale_pipeline());
    let first: *const GpuDownscalePipeline = gpu_ctx.downscale_pipeline().unwrap();
    let second: *const GpuDownscalePipeline = gpu_ctx.downscale_pipeline().unwrap();
    assert!(std::ptr::eq(first, second));
    assert!(gpu_ctx.has_downscale_pipeline());
}

#[test]
fn consecutive_gpu_runs_agree() {
    let mut ctx = ProcessingContext::new();
    if !ctx.has_gpu() {
        return;
    }

    let input = synthetic_scene(256);
    let op = Downscale::new(64);

    let a = op.execute(&mut ctx, ExecutionModel::Gpu, &input).unwrap();
    let b = op.execute(&mut ctx, ExecutionModel::Gpu, &input).unwrap();

    assert_eq!(a, b);
}
