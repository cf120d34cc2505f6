//! Runs one downscale under several execution models and compares the results.

use std::time::Duration;

use crate::common::{max_pixel_diff, mean_pixel_diff, Error, Result};
use crate::grid::PixelGrid;
use crate::ops::{Downscale, ExecutionModel};
use crate::processing_context::ProcessingContext;

/// Result of one execution model.
#[derive(Debug, Clone)]
pub struct ModelRun {
    pub model: ExecutionModel,
    pub output: PixelGrid,
    pub elapsed: Duration,
}

impl ModelRun {
    pub fn millis(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Outcome of running a downscale under several execution models.
///
/// Models whose backend is unavailable are listed in `skipped` instead of failing
/// the whole comparison.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    pub runs: Vec<ModelRun>,
    pub skipped: Vec<(ExecutionModel, String)>,
}

impl Comparison {
    /// Runs `op` on `input` once per model, in the given order.
    ///
    /// # Errors
    /// Any error other than an unavailable backend, e.g. invalid dimensions.
    pub fn run(
        ctx: &mut ProcessingContext,
        op: &Downscale,
        input: &PixelGrid,
        models: &[ExecutionModel],
    ) -> Result<Comparison> {
        let mut comparison = Comparison::default();

        for &model in models {
            match op.execute_timed(ctx, model, input) {
                Ok(timed) => comparison.runs.push(ModelRun {
                    model,
                    output: timed.value,
                    elapsed: timed.elapsed,
                }),
                Err(e) if e.is_backend_unavailable() => {
                    tracing::warn!("skipping {} model: {}", model, e);
                    comparison.skipped.push((model, e.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(comparison)
    }

    pub fn run_for(&self, model: ExecutionModel) -> Option<&ModelRun> {
        self.runs.iter().find(|run| run.model == model)
    }

    /// Largest per-pixel difference between two completed models.
    pub fn max_diff(&self, a: ExecutionModel, b: ExecutionModel) -> Result<u8> {
        let (a, b) = self.pair(a, b)?;
        Ok(max_pixel_diff(&a.output, &b.output))
    }

    pub fn mean_diff(&self, a: ExecutionModel, b: ExecutionModel) -> Result<f64> {
        let (a, b) = self.pair(a, b)?;
        Ok(mean_pixel_diff(&a.output, &b.output))
    }

    /// Logs every timing, and each model's difference from and speedup over the
    /// sequential run when it is present.
    pub fn log_summary(&self) {
        for run in &self.runs {
            tracing::info!("{:>6}: {:>10.3} ms", run.model.label(), run.millis());
        }

        let Some(reference) = self.run_for(ExecutionModel::Sequential) else {
            return;
        };

        for run in self.runs.iter().filter(|run| run.model != reference.model) {
            let speedup = reference.elapsed.as_secs_f64() / run.elapsed.as_secs_f64().max(1e-9);
            tracing::info!(
                "{} vs {}: max diff {}, mean diff {:.4}, speedup {:.2}x",
                run.model,
                reference.model,
                max_pixel_diff(&run.output, &reference.output),
                mean_pixel_diff(&run.output, &reference.output),
                speedup
            );
        }

        for (model, reason) in &self.skipped {
            tracing::info!("{}: skipped ({})", model, reason);
        }
    }

    fn pair(&self, a: ExecutionModel, b: ExecutionModel) -> Result<(&ModelRun, &ModelRun)> {
        let find = |model| {
            self.run_for(model).ok_or_else(|| {
                Error::Config(format!("model {} was not run", model))
            })
        };

        Ok((find(a)?, find(b)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::synthetic_scene;

    #[test]
    fn cpu_models_run_and_agree() {
        let mut ctx = ProcessingContext::cpu_only();
        let input = synthetic_scene(256);

        let comparison = Comparison::run(
            &mut ctx,
            &Downscale::new(128),
            &input,
            &[ExecutionModel::Sequential, ExecutionModel::Tiled],
        )
        .unwrap();

        assert_eq!(comparison.runs.len(), 2);
        assert!(comparison.skipped.is_empty());
        assert_eq!(
            comparison
                .max_diff(ExecutionModel::Sequential, ExecutionModel::Tiled)
                .unwrap(),
            0
        );
        assert_eq!(
            comparison
                .mean_diff(ExecutionModel::Tiled, ExecutionModel::Sequential)
                .unwrap(),
            0.0
        );
        comparison.log_summary();
    }

    #[test]
    fn missing_gpu_is_skipped_not_fatal() {
        let mut ctx = ProcessingContext::cpu_only();
        let input = synthetic_scene(64);

        let comparison =
            Comparison::run(&mut ctx, &Downscale::new(32), &input, ExecutionModel::ALL).unwrap();

        assert!(comparison.run_for(ExecutionModel::Sequential).is_some());
        assert!(comparison.run_for(ExecutionModel::Gpu).is_none());
        assert_eq!(comparison.skipped.len(), 1);
        assert_eq!(comparison.skipped[0].0, ExecutionModel::Gpu);
        assert!(comparison
            .max_diff(ExecutionModel::Sequential, ExecutionModel::Gpu)
            .is_err());
    }

    #[test]
    fn invalid_dimensions_abort_the_comparison() {
        let mut ctx = ProcessingContext::cpu_only();
        let input = PixelGrid::new_empty(64, 48);

        let err = Comparison::run(
            &mut ctx,
            &Downscale::new(16),
            &input,
            &[ExecutionModel::Sequential],
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidDimensions(_)));
    }
}
