// Error handling
pub use crate::common::{Error, Result};

// Grids and image I/O
pub use crate::grid::{load_grayscale_square, present, PixelGrid, SUPPORTED_EXTENSIONS};

// Filter math
pub use crate::kernel::{lanczos, scale_factor, sinc, LanczosKernel, LANCZOS_LOBES};

// Context
pub use crate::processing_context::{GpuContext, ProcessingContext};

// Operations
pub use crate::ops::{Downscale, ExecutionModel, GpuDownscalePipeline};

// Comparison driver
pub use crate::common::{max_pixel_diff, mean_pixel_diff};
pub use crate::compare::{Comparison, ModelRun};
pub use crate::config::CompareConfig;

// Timing
pub use crate::instrument::{Stopwatch, Timed};

// GPU
pub use crate::gpu::{Gpu, GpuGrid, ReadBuffer, WriteBuffer};
