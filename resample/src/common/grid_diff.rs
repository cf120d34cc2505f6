//! Grid comparison used to check execution models against each other.

use rayon::prelude::*;

use crate::grid::PixelGrid;

/// Computes the largest absolute per-pixel difference between two grids.
///
/// # Panics
/// Panics if the grids have different dimensions.
pub fn max_pixel_diff(a: &PixelGrid, b: &PixelGrid) -> u8 {
    assert_same_size(a, b);

    let width = a.width() as usize;

    a.pixels()
        .par_chunks(width)
        .zip(b.pixels().par_chunks(width))
        .map(|(row_a, row_b)| {
            row_a
                .iter()
                .zip(row_b)
                .map(|(&p, &q)| p.abs_diff(q))
                .max()
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
}

/// Computes the mean absolute per-pixel difference between two grids.
///
/// # Panics
/// Panics if the grids have different dimensions.
pub fn mean_pixel_diff(a: &PixelGrid, b: &PixelGrid) -> f64 {
    assert_same_size(a, b);

    let count = a.pixels().len();
    if count == 0 {
        return 0.0;
    }

    let total: u64 = a
        .pixels()
        .par_iter()
        .zip(b.pixels().par_iter())
        .map(|(&p, &q)| p.abs_diff(q) as u64)
        .sum();

    total as f64 / count as f64
}

fn assert_same_size(a: &PixelGrid, b: &PixelGrid) {
    assert_eq!(a.width(), b.width(), "width mismatch");
    assert_eq!(a.height(), b.height(), "height mismatch");
}
