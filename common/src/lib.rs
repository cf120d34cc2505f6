pub mod log_setup;
pub mod test_utils;

pub use log_setup::setup_logging;
