use crate::axis::{self, Axis};
use crate::grid::PixelGrid;
use crate::kernel::LanczosKernel;

/// Resamples `input` along `axis` into `output`, one output pixel at a time.
///
/// `output` must match `input` across the axis; its length along the axis sets the
/// target size.
pub(super) fn filter_axis(
    input: &PixelGrid,
    output: &mut PixelGrid,
    axis: Axis,
    kernel: &LanczosKernel,
) {
    debug_assert_eq!(
        axis.line_count(input.width(), input.height()),
        axis.line_count(output.width(), output.height()),
        "grids differ across the filtered axis"
    );

    let in_len = axis.len(input.width(), input.height());
    let out_len = axis.len(output.width(), output.height());
    let half = kernel.half_size();
    let taps = kernel.taps();

    for y in 0..output.height() {
        for x in 0..output.width() {
            let (along, line) = axis.split(x, y);
            let first = axis::first_tap(along, in_len, out_len, half);

            let mut sum = 0.0f32;
            for (i, &tap) in taps.iter().enumerate() {
                let index = axis::clamp_index(first + i as i64, in_len);
                let (sx, sy) = axis.to_xy(index, line);
                sum += input.get(sx, sy) as f32 * tap;
            }

            output.set(x, y, axis::quantize(sum));
        }
    }
}
