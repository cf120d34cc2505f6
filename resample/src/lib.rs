mod common;
mod compare;
mod config;
mod gpu;
mod grid;
mod instrument;
mod kernel;
mod ops;
mod processing_context;

pub mod axis;
pub mod prelude;

pub use prelude::*;
