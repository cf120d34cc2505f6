//! One-dimensional Lanczos filter coefficients for integer downscale factors.

use std::f32::consts::PI;

use crate::common::{Error, Result};

/// Number of Lanczos lobes (`a`).
pub const LANCZOS_LOBES: u32 = 3;

/// Normalized sinc: `sin(pi z) / (pi z)`, with `sinc(0) = 1`.
#[inline]
pub fn sinc(z: f32) -> f32 {
    if z == 0.0 {
        return 1.0;
    }

    let t = PI * z;
    t.sin() / t
}

/// Lanczos window `sinc(z) * sinc(z / a)`, zero outside `[-a, a]`.
#[inline]
pub fn lanczos(z: f32, a: u32) -> f32 {
    let a = a as f32;
    if z < -a || z > a {
        0.0
    } else {
        sinc(z) * sinc(z / a)
    }
}

/// Returns `input_side / output_side`, rejecting sizes that are not an integer downscale.
pub fn scale_factor(input_side: u32, output_side: u32) -> Result<u32> {
    if output_side == 0 {
        return Err(Error::InvalidDimensions(
            "output side must be positive".to_string(),
        ));
    }
    if output_side > input_side {
        return Err(Error::InvalidDimensions(format!(
            "cannot upscale from {} to {}",
            input_side, output_side
        )));
    }
    if input_side % output_side != 0 {
        return Err(Error::InvalidDimensions(format!(
            "output side {} does not evenly divide input side {}",
            output_side, input_side
        )));
    }

    Ok(input_side / output_side)
}

/// Symmetric, normalized Lanczos kernel of `2 * half_size` taps.
///
/// Tap `i` samples the window at `(half_size - 0.5 - i) / factor`, so the taps sit
/// on half-integer offsets around the tap-alignment point and the kernel stretches
/// with the downscale factor.
#[derive(Debug, Clone, PartialEq)]
pub struct LanczosKernel {
    factor: u32,
    half_size: u32,
    taps: Vec<f32>,
}

impl LanczosKernel {
    pub fn new(input_side: u32, output_side: u32) -> Result<LanczosKernel> {
        let factor = scale_factor(input_side, output_side)?;
        Ok(Self::with_factor(factor))
    }

    /// Builds the kernel for a known integer factor (`factor >= 1`).
    pub fn with_factor(factor: u32) -> LanczosKernel {
        debug_assert!(factor >= 1, "factor must be at least 1");

        let half_size = LANCZOS_LOBES * factor;
        let size = 2 * half_size as usize;

        let mut taps = vec![0.0f32; size];
        let mut sum = 0.0f32;

        for i in 0..size {
            let tap = if i < half_size as usize {
                lanczos(
                    (half_size as f32 - 0.5 - i as f32) / factor as f32,
                    LANCZOS_LOBES,
                )
            } else {
                taps[size - i - 1]
            };

            taps[i] = tap;
            sum += tap;
        }

        for tap in taps.iter_mut() {
            *tap /= sum;
        }

        LanczosKernel {
            factor,
            half_size,
            taps,
        }
    }

    pub fn factor(&self) -> u32 {
        self.factor
    }

    pub fn half_size(&self) -> u32 {
        self.half_size
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }

    pub fn taps(&self) -> &[f32] {
        &self.taps
    }
}
