//! Display module for notification output
//!
//! Colour support and rendering of store snapshots for the driver binary,
//! keeping terminal compatibility (NO_COLOR, --no-color) and a JSON mode.

pub mod colours;
pub mod config;
pub mod render;

pub use colours::*;
pub use config::*;
pub use render::*;
