//! End-to-end prompt processing: parse, validate, adjust, synthesize, analyze.

use crate::analysis::{analyze_dfm, estimate_cost, expected_extents, CostEstimate, DfmReport};
use crate::config::{EngineConfig, ACCURACY_TOLERANCE_MM};
use crate::error::{PipelineError, Result};
use crate::generator::synthesize;
use crate::kernel::{new_request_id, ExportArtifacts, GeometryKernel};
use crate::model::{DimensionSet, FeatureSpec, FormatKind, GeometryPlan, HoleSpec, ShapeKind};
use crate::parser::{
    classify_shape, detect_ambiguities, detect_assembly, detect_features, extract_dimensions,
    AiReparser, Ambiguity,
};
use crate::transform::prepare_dimensions;
use crate::validation::{
    check_dimensional_accuracy, needs_ai_reparse, validate, AccuracyReport, ValidationReport,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Everything derived from one prompt, short of exporting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartReport {
    pub prompt: String,
    pub shape: ShapeKind,
    /// Dimensions after feature recording and fit adjustment.
    pub dimensions: DimensionSet,
    pub features: FeatureSpec,
    pub validation: ValidationReport,
    /// Whether the AI fallback supplied the dimensions.
    pub ai_reparsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_note: Option<String>,
    pub plan: GeometryPlan,
    pub material: String,
    pub dfm: DfmReport,
    pub cost: CostEstimate,
    pub is_assembly: bool,
    pub components: Vec<String>,
    pub ambiguities: Vec<Ambiguity>,
    /// Bounding box the plan should export to (X, Y, Z); `None` where unknown.
    pub expected_extents: [Option<f64>; 3],
}

/// Result of exporting a processed part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportReport {
    pub artifacts: ExportArtifacts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<AccuracyReport>,
}

/// Run the full pipeline on a prompt.
///
/// `material` overrides the configured default. Fails with
/// [`PipelineError::ParseEmpty`] before any synthesis when the prompt carries
/// no dimensions.
pub fn process_prompt(
    text: &str,
    material: Option<&str>,
    config: &EngineConfig,
    assist: Option<&dyn AiReparser>,
) -> Result<PartReport> {
    info!("Processing prompt: {}", text);

    let (mut dims, validation, ai_reparsed) = parse_and_validate(text, config, assist)?;
    for warning in &validation.warnings {
        warn!("{}", warning);
    }

    let shape = classify_shape(text);
    let features = detect_features(text);
    debug!("Classified as {} with features {:?}", shape, features);

    record_features(&mut dims, &features);
    if shape == ShapeKind::Gear && dims.teeth.is_none() {
        dims.teeth = Some(config.default_gear_teeth);
    }

    let fit_note = prepare_dimensions(shape, &mut dims);
    let mut plan = synthesize(shape, &dims, &features)?;
    if let Some(note) = &fit_note {
        plan.notes.insert(0, note.clone());
    }

    let requested_material = material;
    let material = config
        .materials
        .get(material.unwrap_or(config.default_material.as_str()))?;
    let dfm = analyze_dfm(shape, &dims, material, &config.dfm);
    let cost = estimate_cost(shape, &dims, material, &config.cost);
    info!(
        "DFM score {} ({}), total cost {:.2}",
        dfm.score, dfm.recommended_process, cost.total_cost
    );

    let (is_assembly, components) = detect_assembly(text);
    if is_assembly {
        info!("Assembly of {} component(s): {}", components.len(), components.join(", "));
    }
    let ambiguities = detect_ambiguities(text, requested_material);

    Ok(PartReport {
        prompt: text.to_string(),
        shape,
        expected_extents: expected_extents(shape, &dims),
        dimensions: dims,
        features,
        validation,
        ai_reparsed,
        fit_note,
        plan,
        material: material.name.clone(),
        dfm,
        cost,
        is_assembly,
        components,
        ambiguities,
    })
}

/// Export a processed part and compare the exported bounding box with the
/// expected extents.
pub fn export_part(
    report: &PartReport,
    kernel: &dyn GeometryKernel,
    formats: &[FormatKind],
) -> Result<ExportReport> {
    let request_id = new_request_id();
    info!("Exporting request {} as {:?}", request_id, formats);
    let artifacts = kernel.export(&report.plan, formats, &request_id)?;

    let accuracy = artifacts.bounding_box.map(|measured| {
        let accuracy =
            check_dimensional_accuracy(report.expected_extents, measured, ACCURACY_TOLERANCE_MM);
        if accuracy.valid {
            debug!("{}", accuracy.message);
        } else {
            warn!("{}", accuracy.message);
        }
        accuracy
    });

    Ok(ExportReport {
        artifacts,
        accuracy,
    })
}

/// Extract and validate, consulting the AI fallback when warnings pile up.
fn parse_and_validate(
    text: &str,
    config: &EngineConfig,
    assist: Option<&dyn AiReparser>,
) -> Result<(DimensionSet, ValidationReport, bool)> {
    let dims = extract_dimensions(text);
    let validation = validate(&dims, text);
    if !validation.valid {
        return Err(PipelineError::ParseEmpty);
    }

    if !needs_ai_reparse(&validation, config.ai_warning_threshold) {
        return Ok((dims, validation, false));
    }
    let Some(assist) = assist else {
        debug!("{} warnings but no AI fallback configured", validation.warnings.len());
        return Ok((dims, validation, false));
    };

    match assist.reparse(text) {
        Some(mut ai_dims) => {
            ai_dims.fill_missing_from(&dims);
            ai_dims.derive_radius_diameter();
            let ai_validation = validate(&ai_dims, text);
            if ai_validation.valid {
                info!("Using AI re-parse ({} warning(s))", ai_validation.warnings.len());
                Ok((ai_dims, ai_validation, true))
            } else {
                warn!("AI re-parse produced no usable dimensions; keeping deterministic parse");
                Ok((dims, validation, false))
            }
        }
        None => Ok((dims, validation, false)),
    }
}

/// Copy detected feature sizes into the dimension set.
///
/// Default hole diameters stay out of the set so each shape can apply its own.
fn record_features(dims: &mut DimensionSet, features: &FeatureSpec) {
    if let Some(HoleSpec {
        count,
        diameter,
        diameter_explicit,
        ..
    }) = &features.holes
    {
        if *diameter_explicit {
            dims.hole_diameter.get_or_insert(*diameter);
        }
        dims.hole_count.get_or_insert(*count);
    }
    if let Some(fillet) = &features.fillet {
        dims.fillet_radius.get_or_insert(fillet.radius);
    }
    if let Some(chamfer) = &features.chamfer {
        dims.chamfer_size.get_or_insert(chamfer.size);
    }
}
