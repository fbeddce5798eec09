//! Data model types for the prompt-to-part pipeline.

mod dimensions;
mod feature;
mod format;
mod material;
mod plan;
mod shape;

pub use dimensions::DimensionSet;
pub use feature::{
    ChamferSpec, FeatureOutcomes, FeatureSpec, FilletSpec, HoleOutcome, HolePlacement, HoleSpec,
    ThreadOutcome, TreatmentOutcome,
};
pub use format::{ExportKind, FormatKind};
pub use material::{Material, MaterialFamily, MaterialTable};
pub use plan::{GeometryPlan, Operation, Placement, Primitive, PrimitiveKind, Rotation};
pub use shape::ShapeKind;
