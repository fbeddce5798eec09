//! Manufacturability and cost analysis.

mod cost;
mod dfm;
mod geometry;
mod pricing;

pub use cost::{complexity_factor, estimate_cost, CostEstimate, PriceBreak};
pub use dfm::{analyze_dfm, recommend_process, DfmIssue, DfmReport, DfmWarning, Severity};
pub use geometry::{expected_extents, surface_area_mm2, volume_mm3};
pub use pricing::{PriceSource, SharedMaterials, StaticPrices};
