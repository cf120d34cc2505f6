mod downscale;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use downscale::{Downscale, GpuDownscalePipeline};

/// How a downscale pipeline is executed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionModel {
    /// Single-threaded reference implementation.
    Sequential,
    /// Work-group protocol emulated on the CPU thread pool.
    Tiled,
    /// Work-group protocol as a compute shader.
    Gpu,
}

impl ExecutionModel {
    pub const ALL: &'static [ExecutionModel] = &[
        ExecutionModel::Sequential,
        ExecutionModel::Tiled,
        ExecutionModel::Gpu,
    ];

    /// Short label used for timing reports and output titles.
    pub fn label(self) -> &'static str {
        match self {
            ExecutionModel::Sequential => "cpu",
            ExecutionModel::Tiled => "tiled",
            ExecutionModel::Gpu => "gpu",
        }
    }

    pub fn is_data_parallel(self) -> bool {
        !matches!(self, ExecutionModel::Sequential)
    }
}

impl fmt::Display for ExecutionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
