//! Prompt parser module.

mod assist;
mod classify;
pub(crate) mod patterns;
mod prompt;

pub use assist::{detect_ambiguities, AiReparser, Ambiguity, AmbiguityKind, Importance, NoAssist};
pub use classify::{classify_shape, detect_assembly, detect_features};
pub use prompt::extract_dimensions;
