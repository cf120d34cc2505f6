//! Index math shared by every execution model.
//!
//! The sequential filter, the CPU work-group emulation and the GPU shader all map
//! output positions to input taps through these functions (the shader carries a
//! line-for-line WGSL copy of them, with its tile constants generated from the
//! ones below).

use crate::common::{Error, Result};
use crate::kernel::LANCZOS_LOBES;

/// Workers per work-group; each owns one output position of a line.
pub const TILE_SIZE: u32 = 64;
/// Capacity of the group-shared sample cache.
pub const MAX_SPAN_SAMPLES: u32 = 2048;
/// Capacity of the group-shared kernel cache.
pub const MAX_KERNEL_TAPS: u32 = 512;

/// Largest downscale factor whose tile span fits the shared sample cache.
///
/// A tile of `TILE_SIZE` outputs reads `(TILE_SIZE - 1) * factor + 2 * a * factor`
/// input samples.
pub const fn max_tiled_factor() -> u32 {
    let by_span = MAX_SPAN_SAMPLES / (TILE_SIZE - 1 + 2 * LANCZOS_LOBES);
    let by_taps = MAX_KERNEL_TAPS / (2 * LANCZOS_LOBES);
    if by_span < by_taps {
        by_span
    } else {
        by_taps
    }
}

/// Rejects factors the tiled execution models cannot stage in shared memory.
pub fn check_tiled_factor(factor: u32) -> Result<()> {
    if factor > max_tiled_factor() {
        return Err(Error::InvalidDimensions(format!(
            "downscale factor {} exceeds the tiled limit of {}",
            factor,
            max_tiled_factor()
        )));
    }

    Ok(())
}

/// Axis resampled by one filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Resizes height, columns are the lines. Step `(0, 1)`.
    Vertical,
    /// Resizes width, rows are the lines. Step `(1, 0)`.
    Horizontal,
}

impl Axis {
    /// The `(dx, dy)` unit step along this axis.
    pub const fn step(self) -> (u32, u32) {
        match self {
            Axis::Vertical => (0, 1),
            Axis::Horizontal => (1, 0),
        }
    }

    /// Length of this axis in a `width x height` grid.
    pub const fn len(self, width: u32, height: u32) -> u32 {
        match self {
            Axis::Vertical => height,
            Axis::Horizontal => width,
        }
    }

    /// Number of independent lines along this axis, i.e. the other dimension.
    pub const fn line_count(self, width: u32, height: u32) -> u32 {
        match self {
            Axis::Vertical => width,
            Axis::Horizontal => height,
        }
    }

    /// Maps a position along the axis on a given line to grid `(x, y)`.
    #[inline]
    pub const fn to_xy(self, along: u32, line: u32) -> (u32, u32) {
        let (dx, dy) = self.step();
        (along * dx + line * dy, line * dx + along * dy)
    }

    /// Inverse of [`Axis::to_xy`]: grid `(x, y)` to `(along, line)`.
    #[inline]
    pub const fn split(self, x: u32, y: u32) -> (u32, u32) {
        let (dx, dy) = self.step();
        (x * dx + y * dy, y * dx + x * dy)
    }
}

/// Floor of the continuous input coordinate `(o + 0.5) * in_len / out_len - 0.5`.
///
/// Evaluated exactly as `floor(((2o + 1) * in_len - out_len) / (2 * out_len))`.
/// Domain: `o < out_len`, `0 < out_len <= in_len`. Range: `[0, in_len - 1]`.
#[inline]
pub fn source_floor(o: u32, in_len: u32, out_len: u32) -> i64 {
    let numerator = (2 * o as i64 + 1) * in_len as i64 - out_len as i64;
    numerator.div_euclid(2 * out_len as i64)
}

/// Unclamped input index of the first of `2 * half` taps for output `o`.
#[inline]
pub fn first_tap(o: u32, in_len: u32, out_len: u32, half: u32) -> i64 {
    source_floor(o, in_len, out_len) - half as i64 + 1
}

/// Pins a tap index into `[0, len - 1]`, replicating edge samples.
#[inline]
pub fn clamp_index(index: i64, len: u32) -> u32 {
    debug_assert!(len > 0);
    index.clamp(0, len as i64 - 1) as u32
}

/// Rounds an accumulated sum to the nearest intensity, saturating at `[0, 255]`.
#[inline]
pub fn quantize(sum: f32) -> u8 {
    (sum + 0.5).clamp(0.0, 255.0) as u8
}

/// Input range staged by one work-group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    /// First output position owned by the group.
    pub first_output: u32,
    /// Number of valid outputs, at most `TILE_SIZE`.
    pub output_count: u32,
    /// Unclamped input index held in cache slot 0.
    pub span_start: i64,
    /// Number of cached samples.
    pub span_len: u32,
}

impl TileSpan {
    pub fn tile_count(out_len: u32) -> u32 {
        out_len.div_ceil(TILE_SIZE)
    }

    /// Span of tile `tile` for a pass of `in_len -> out_len` with a `2 * half` tap kernel.
    pub fn new(tile: u32, in_len: u32, out_len: u32, half: u32) -> TileSpan {
        let first_output = tile * TILE_SIZE;
        debug_assert!(first_output < out_len, "tile {} out of range", tile);

        let last_output = (first_output + TILE_SIZE).min(out_len) - 1;
        let span_start = first_tap(first_output, in_len, out_len, half);
        let span_end = source_floor(last_output, in_len, out_len) + half as i64;

        TileSpan {
            first_output,
            output_count: last_output - first_output + 1,
            span_start,
            span_len: (span_end - span_start + 1) as u32,
        }
    }

    /// Cache slot holding the first tap of output `o`.
    #[inline]
    pub fn cache_offset(&self, o: u32, in_len: u32, out_len: u32, half: u32) -> usize {
        (first_tap(o, in_len, out_len, half) - self.span_start) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_floor(o: u32, in_len: u32, out_len: u32) -> i64 {
        ((o as f64 + 0.5) * in_len as f64 / out_len as f64 - 0.5).floor() as i64
    }

    #[test]
    fn source_floor_matches_continuous_mapping() {
        for &(in_len, out_len) in &[(8, 4), (9, 3), (1024, 256), (100, 100), (96, 32), (7, 7)] {
            for o in 0..out_len {
                assert_eq!(
                    source_floor(o, in_len, out_len),
                    reference_floor(o, in_len, out_len),
                    "o={} {}->{}",
                    o,
                    in_len,
                    out_len
                );
            }
        }
    }

    #[test]
    fn source_floor_for_integer_factor() {
        // factor 4: (o + 0.5) * 4 - 0.5 = 4o + 1.5
        assert_eq!(source_floor(0, 16, 4), 1);
        assert_eq!(source_floor(3, 16, 4), 13);
        // factor 3: 3o + 1 exactly
        assert_eq!(source_floor(2, 9, 3), 7);
        // identity
        assert_eq!(source_floor(5, 10, 10), 5);
    }

    #[test]
    fn clamp_index_replicates_edges() {
        assert_eq!(clamp_index(-7, 10), 0);
        assert_eq!(clamp_index(0, 10), 0);
        assert_eq!(clamp_index(9, 10), 9);
        assert_eq!(clamp_index(10, 10), 9);
        assert_eq!(clamp_index(1000, 10), 9);
        assert_eq!(clamp_index(3, 1), 0);
    }

    #[test]
    fn quantize_rounds_and_saturates() {
        assert_eq!(quantize(-40.0), 0);
        assert_eq!(quantize(0.49), 0);
        assert_eq!(quantize(0.5), 1);
        assert_eq!(quantize(127.99999), 128);
        assert_eq!(quantize(128.4), 128);
        assert_eq!(quantize(254.6), 255);
        assert_eq!(quantize(300.0), 255);
    }

    #[test]
    fn axis_steps_and_mapping() {
        assert_eq!(Axis::Vertical.step(), (0, 1));
        assert_eq!(Axis::Horizontal.step(), (1, 0));

        assert_eq!(Axis::Vertical.len(10, 4), 4);
        assert_eq!(Axis::Vertical.line_count(10, 4), 10);
        assert_eq!(Axis::Horizontal.len(10, 4), 10);
        assert_eq!(Axis::Horizontal.line_count(10, 4), 4);

        for axis in [Axis::Vertical, Axis::Horizontal] {
            let (x, y) = axis.to_xy(3, 7);
            assert_eq!(axis.split(x, y), (3, 7));
        }
        assert_eq!(Axis::Vertical.to_xy(3, 7), (7, 3));
        assert_eq!(Axis::Horizontal.to_xy(3, 7), (3, 7));
    }

    #[test]
    fn max_factor_fits_caches() {
        let factor = max_tiled_factor();
        assert_eq!(factor, 29);

        let half = LANCZOS_LOBES * factor;
        let out_len = TILE_SIZE * 4;
        let in_len = out_len * factor;
        for tile in 0..TileSpan::tile_count(out_len) {
            let span = TileSpan::new(tile, in_len, out_len, half);
            assert!(span.span_len <= MAX_SPAN_SAMPLES);
        }
        assert!(2 * half <= MAX_KERNEL_TAPS);

        assert!(check_tiled_factor(factor).is_ok());
        assert!(matches!(
            check_tiled_factor(factor + 1),
            Err(Error::InvalidDimensions(_))
        ));
    }

    #[test]
    fn tile_span_covers_every_tap_of_its_outputs() {
        let (in_len, out_len, half) = (600, 150, 12);
        let tiles = TileSpan::tile_count(out_len);
        assert_eq!(tiles, 3);

        for tile in 0..tiles {
            let span = TileSpan::new(tile, in_len, out_len, half);
            let last = span.first_output + span.output_count - 1;

            assert_eq!(span.span_start, first_tap(span.first_output, in_len, out_len, half));
            for o in span.first_output..=last {
                let offset = span.cache_offset(o, in_len, out_len, half);
                assert!(offset + 2 * half as usize <= span.span_len as usize);
            }
        }

        let tail = TileSpan::new(2, in_len, out_len, half);
        assert_eq!(tail.first_output, 128);
        assert_eq!(tail.output_count, 22);
    }
}
