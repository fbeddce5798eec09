//! textcad - Turn short manufacturing prompts into parametric parts.
//!
//! This library parses prompts such as "50x50x10 plate with 5mm center hole" into
//! typed dimensions, synthesizes a solid geometry plan, scores it for
//! manufacturability and estimates its cost. Plans compile to FreeCAD scripts and
//! can be exported through an external `FreeCADCmd`.
//!
//! # Example
//!
//! ```no_run
//! use textcad::{export_part, process_prompt, EngineConfig, FormatKind, FreeCadKernel};
//!
//! let config = EngineConfig::default();
//! let report = process_prompt("50x50x10 plate with 5mm center hole", None, &config, None).unwrap();
//! println!("DFM score {}, total {:.2}", report.dfm.score, report.cost.total_cost);
//!
//! let kernel = FreeCadKernel::discover(config.kernel.clone()).unwrap();
//! let exported = export_part(&report, &kernel, &[FormatKind::Step]).unwrap();
//! println!("{:?}", exported.artifacts.files);
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod generator;
pub mod kernel;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod transform;
pub mod validation;

// Re-exports for convenience
pub use analysis::{analyze_dfm, estimate_cost, CostEstimate, DfmReport};
pub use config::{EngineConfig, Unit};
pub use error::{PipelineError, Result};
pub use generator::{compile_freecad_script, synthesize};
pub use kernel::{ExportArtifacts, FreeCadKernel, GeometryKernel};
pub use model::{DimensionSet, FeatureSpec, FormatKind, GeometryPlan, Material, ShapeKind};
pub use parser::{classify_shape, detect_features, extract_dimensions, AiReparser};
pub use pipeline::{export_part, process_prompt, ExportReport, PartReport};
pub use transform::apply_fit;
pub use validation::{validate, ValidationReport};
