pub(crate) mod error;
pub(crate) mod grid_diff;
#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{Error, Result};
pub use grid_diff::{max_pixel_diff, mean_pixel_diff};
