//! Dimension and export validation.

mod accuracy;
mod validate;

pub use accuracy::{check_dimensional_accuracy, AccuracyReport, AxisCheck};
pub use validate::{needs_ai_reparse, validate, ValidationReport};
