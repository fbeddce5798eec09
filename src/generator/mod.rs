//! Geometry synthesis and FreeCAD script compilation.

mod features;
mod freecad;
mod gear;
mod script;
mod shapes;
pub mod sizing;

pub use features::{edge_lengths, iso_coarse_pitch};
pub use freecad::{compile_freecad_script, compile_measure_script};
pub use gear::gear_profile;
pub use script::{format_float, ScriptWriter};

use crate::config::MAX_FEATURE_COUNT;
use crate::error::{PipelineError, Result};
use crate::model::{DimensionSet, FeatureSpec, GeometryPlan, ShapeKind};
use crate::transform::prepare_dimensions;
use tracing::{debug, info};

/// Build the geometry plan for a classified part.
///
/// Applies the fit adjustment itself when `dims` has not been prepared yet,
/// then synthesizes the base body and runs the feature pass.
pub fn synthesize(
    shape: ShapeKind,
    dims: &DimensionSet,
    features: &FeatureSpec,
) -> Result<GeometryPlan> {
    for (name, count) in dims.counts() {
        if count > MAX_FEATURE_COUNT {
            return Err(PipelineError::geometry(
                shape,
                name,
                format!("{} exceeds the limit of {}", count, MAX_FEATURE_COUNT),
            ));
        }
    }

    let mut dims = dims.clone();
    let fit_note = prepare_dimensions(shape, &mut dims);

    let body = match shape {
        ShapeKind::Box => shapes::synthesize_box(&dims),
        ShapeKind::PlateWithHole => shapes::synthesize_plate_with_hole(&dims, features),
        ShapeKind::Cylinder | ShapeKind::Piston => shapes::synthesize_cylinder(shape, &dims),
        ShapeKind::Flange => shapes::synthesize_flange(&dims, features),
        ShapeKind::Sphere => shapes::synthesize_sphere(&dims),
        ShapeKind::Cone => shapes::synthesize_cone(&dims),
        ShapeKind::Tube => shapes::synthesize_tube(&dims),
        ShapeKind::Washer => shapes::synthesize_washer(&dims),
        ShapeKind::Bolt => shapes::synthesize_bolt(&dims),
        ShapeKind::Gear => shapes::synthesize_gear_body(&dims),
        ShapeKind::Crankshaft => shapes::synthesize_crankshaft(&dims),
        ShapeKind::Camshaft => shapes::synthesize_camshaft(&dims),
    }?;

    let mut plan = body.plan;
    if let Some(note) = fit_note {
        plan.notes.insert(0, note);
    }
    features::apply_features(&mut plan, &body.frame, features, body.holes_consumed)?;
    debug_assert!(plan.is_well_formed(), "malformed plan for {}", shape);

    info!(
        "Synthesized {}: {} primitive(s), {} operation(s), result {}",
        shape,
        plan.primitives.len(),
        plan.operations.len(),
        plan.result
    );
    for warning in &plan.warnings {
        debug!("Synthesis warning: {}", warning);
    }
    Ok(plan)
}
