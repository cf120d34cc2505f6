use std::path::{Path, PathBuf};

use super::PixelGrid;
use crate::common::{Error, Result};

pub(super) fn load_luma<P: AsRef<Path>>(filename: P) -> Result<PixelGrid> {
    let img = image::open(filename)?.into_luma8();
    let (width, height) = img.dimensions();

    PixelGrid::new_with_data(width, height, img.into_raw())
}

pub(super) fn save_luma<P: AsRef<Path>>(grid: &PixelGrid, filename: P) -> Result<()> {
    let img = image::GrayImage::from_raw(grid.width(), grid.height(), grid.pixels().to_vec())
        .ok_or_else(|| {
            Error::Encoding(format!(
                "pixel buffer does not fit {}x{}",
                grid.width(),
                grid.height()
            ))
        })?;

    img.save(filename)?;

    Ok(())
}

/// Loads an image as 8-bit grayscale and requires it to be square.
pub fn load_grayscale_square<P: AsRef<Path>>(filename: P) -> Result<PixelGrid> {
    let grid = PixelGrid::read_file(filename)?;
    grid.side()?;

    Ok(grid)
}

/// Presents a grid under `title` by writing it as `<dir>/<title>.png`.
///
/// Spaces in the title become underscores. Returns the written path.
pub fn present(title: &str, grid: &PixelGrid, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let file_name: String = title
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let path = dir.join(format!("{}.png", file_name));

    grid.save_file(&path)?;
    tracing::info!(
        "{}: {}x{} -> {}",
        title,
        grid.width(),
        grid.height(),
        path.display()
    );

    Ok(path)
}
