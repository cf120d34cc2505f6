use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::gpu::Gpu;
use crate::grid::PixelGrid;

/// Returns a GPU session, or `None` on machines without a usable adapter.
pub fn test_gpu() -> Option<Gpu> {
    match Gpu::new() {
        Ok(gpu) => Some(gpu),
        Err(e) => {
            eprintln!("Skipping GPU test - no GPU available: {}", e);
            None
        }
    }
}

/// Alternating 0/255 pattern, black at the origin.
pub fn checkerboard(side: u32) -> PixelGrid {
    PixelGrid::from_fn(side, side, |x, y| if (x + y) % 2 == 0 { 0 } else { 255 })
}

pub fn random_grid(width: u32, height: u32, seed: u64) -> PixelGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    PixelGrid::from_fn(width, height, |_, _| rng.random())
}

/// Smooth diagonal gradient with a bright disc, closer to a photograph than noise.
pub fn synthetic_scene(side: u32) -> PixelGrid {
    let center = side as f32 / 2.0;
    let radius = side as f32 / 4.0;
    PixelGrid::from_fn(side, side, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        if dx * dx + dy * dy < radius * radius {
            230
        } else {
            ((x + y) * 255 / (2 * side)) as u8
        }
    })
}
