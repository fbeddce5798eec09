//! Dimension adjustments applied between parsing and synthesis.

mod fit;
mod prepare;

pub use fit::{apply_fit, is_known_fit};
pub use prepare::prepare_dimensions;
