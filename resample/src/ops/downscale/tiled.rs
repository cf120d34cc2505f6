//! The work-group protocol of the compute shader, run on the CPU thread pool.
//!
//! Each rayon task plays one work-group of `TILE_SIZE` workers. All workers run
//! their load phase before any worker runs its compute phase, which is exactly the
//! ordering the shader's barrier provides. Workers read only the group's caches
//! while accumulating.

use rayon::prelude::*;

use crate::axis::{self, Axis, TileSpan, MAX_KERNEL_TAPS, MAX_SPAN_SAMPLES, TILE_SIZE};
use crate::grid::PixelGrid;
use crate::kernel::LanczosKernel;

/// Group-shared memory of one work-group.
struct SharedCache {
    samples: Vec<f32>,
    taps: Vec<f32>,
}

impl SharedCache {
    fn new() -> Self {
        Self {
            samples: vec![0.0; MAX_SPAN_SAMPLES as usize],
            taps: vec![0.0; MAX_KERNEL_TAPS as usize],
        }
    }
}

/// Read-only state shared by every group of one pass.
struct AxisPass<'a> {
    input: &'a PixelGrid,
    axis: Axis,
    taps: &'a [f32],
    half: u32,
    in_len: u32,
    out_len: u32,
}

impl AxisPass<'_> {
    /// Worker `worker` stages span slots `worker, worker + TILE_SIZE, ...` and the
    /// matching kernel slots.
    fn load(&self, worker: u32, line: u32, span: &TileSpan, cache: &mut SharedCache) {
        let mut slot = worker;
        while slot < span.span_len {
            let index = axis::clamp_index(span.span_start + slot as i64, self.in_len);
            let (x, y) = self.axis.to_xy(index, line);
            cache.samples[slot as usize] = self.input.get(x, y) as f32;
            slot += TILE_SIZE;
        }

        let mut slot = worker as usize;
        while slot < self.taps.len() {
            cache.taps[slot] = self.taps[slot];
            slot += TILE_SIZE as usize;
        }
    }

    /// Returns `None` for workers past the end of the line.
    fn compute(&self, worker: u32, span: &TileSpan, cache: &SharedCache) -> Option<u8> {
        let o = span.first_output + worker;
        if o >= self.out_len {
            return None;
        }

        let kernel_size = self.taps.len();
        let base = span.cache_offset(o, self.in_len, self.out_len, self.half);

        let sum = cache.samples[base..base + kernel_size]
            .iter()
            .zip(&cache.taps[..kernel_size])
            .fold(0.0f32, |acc, (&sample, &tap)| acc + sample * tap);

        Some(axis::quantize(sum))
    }

    /// Runs one work-group, writing its outputs into `cells`.
    fn run_group(&self, tile: u32, line: u32, cache: &mut SharedCache, cells: &mut [u8]) {
        let span = TileSpan::new(tile, self.in_len, self.out_len, self.half);
        debug_assert!(span.span_len <= MAX_SPAN_SAMPLES);
        debug_assert!(self.taps.len() <= MAX_KERNEL_TAPS as usize);

        for worker in 0..TILE_SIZE {
            self.load(worker, line, &span, cache);
        }

        // barrier

        for worker in 0..TILE_SIZE {
            if let Some(value) = self.compute(worker, &span, cache) {
                cells[worker as usize] = value;
            }
        }
    }

    /// Runs every group of the pass into a line-major buffer of `lines * out_len`.
    fn run(&self, lines: u32, line_major: &mut [u8]) {
        line_major
            .par_chunks_mut(self.out_len as usize)
            .enumerate()
            .for_each(|(line, out_line)| {
                out_line
                    .par_chunks_mut(TILE_SIZE as usize)
                    .enumerate()
                    .for_each_init(SharedCache::new, |cache, (tile, cells)| {
                        self.run_group(tile as u32, line as u32, cache, cells);
                    });
            });

        debug_assert_eq!(line_major.len(), (lines * self.out_len) as usize);
    }
}

/// Tiled counterpart of `cpu::filter_axis`. The factor must be within
/// [`axis::max_tiled_factor`].
pub(super) fn filter_axis(
    input: &PixelGrid,
    output: &mut PixelGrid,
    axis: Axis,
    kernel: &LanczosKernel,
) {
    let lines = axis.line_count(output.width(), output.height());
    debug_assert_eq!(lines, axis.line_count(input.width(), input.height()));

    let pass = AxisPass {
        input,
        axis,
        taps: kernel.taps(),
        half: kernel.half_size(),
        in_len: axis.len(input.width(), input.height()),
        out_len: axis.len(output.width(), output.height()),
    };

    match axis {
        // Rows are lines, so the row-major output already is line-major.
        Axis::Horizontal => pass.run(lines, output.pixels_mut()),
        Axis::Vertical => {
            let mut columns = vec![0u8; output.pixels().len()];
            pass.run(lines, &mut columns);
            transpose_into(&columns, output);
        }
    }
}

/// Writes a column-major buffer into a row-major grid.
fn transpose_into(columns: &[u8], output: &mut PixelGrid) {
    let width = output.width() as usize;
    let height = output.height() as usize;

    output
        .pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = columns[x * height + y];
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::random_grid;

    #[test]
    fn transpose_into_reorders_columns() {
        // 3 columns of height 2
        let columns = [1, 2, 3, 4, 5, 6];
        let mut output = PixelGrid::new_empty(3, 2);

        transpose_into(&columns, &mut output);

        assert_eq!(output.pixels(), &[1, 3, 5, 2, 4, 6]);
    }

    #[test]
    fn group_leaves_cells_past_the_line_untouched() {
        let input = random_grid(40, 1, 3);
        let kernel = LanczosKernel::with_factor(2);
        let pass = AxisPass {
            input: &input,
            axis: Axis::Horizontal,
            taps: kernel.taps(),
            half: kernel.half_size(),
            in_len: 40,
            out_len: 20,
        };

        let mut cache = SharedCache::new();
        let mut cells = vec![0xAB; TILE_SIZE as usize];
        pass.run_group(0, 0, &mut cache, &mut cells);

        assert!(cells[20..].iter().all(|&c| c == 0xAB));
    }

    #[test]
    fn matches_sequential_filter_on_both_axes() {
        // Wider than one tile on both axes so several groups and halos are involved.
        let input = random_grid(300, 200, 17);
        let kernel = LanczosKernel::with_factor(2);

        let mut expected = PixelGrid::new_empty(300, 100);
        super::super::cpu::filter_axis(&input, &mut expected, Axis::Vertical, &kernel);
        let mut actual = PixelGrid::new_empty(300, 100);
        filter_axis(&input, &mut actual, Axis::Vertical, &kernel);
        assert_eq!(actual, expected);

        let mut expected = PixelGrid::new_empty(150, 200);
        super::super::cpu::filter_axis(&input, &mut expected, Axis::Horizontal, &kernel);
        let mut actual = PixelGrid::new_empty(150, 200);
        filter_axis(&input, &mut actual, Axis::Horizontal, &kernel);
        assert_eq!(actual, expected);
    }
}
