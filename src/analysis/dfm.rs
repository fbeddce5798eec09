//! Design-for-manufacturing rule checks.

use super::geometry::volume_mm3;
use crate::config::DfmConfig;
use crate::generator::sizing::{bolt_size, box_size, cylinder_size, gear_size, tube_size, washer_size};
use crate::model::{DimensionSet, Material, ShapeKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Finding severity; each level carries its own score penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Manufacturability rule that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DfmIssue {
    ThinWall,
    AspectRatio,
    DeepFeature,
    SmallFeatures,
    HardMaterialGear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfmWarning {
    #[serde(rename = "type")]
    pub issue: DfmIssue,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
}

/// DFM score with findings and a process recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DfmReport {
    /// 0 to 100, higher is easier to make.
    pub score: u32,
    pub warnings: Vec<DfmWarning>,
    pub recommended_process: String,
}

impl DfmReport {
    pub fn has(&self, issue: DfmIssue) -> bool {
        self.warnings.iter().any(|w| w.issue == issue)
    }
}

fn warning(issue: DfmIssue, severity: Severity, message: String, suggestion: &str) -> DfmWarning {
    DfmWarning {
        issue,
        severity,
        message,
        suggestion: suggestion.to_string(),
    }
}

/// Height and diameter of round parts for the depth rule.
fn turned_proportions(shape: ShapeKind, dims: &DimensionSet) -> Option<(f64, f64)> {
    match shape {
        ShapeKind::Cylinder | ShapeKind::Piston | ShapeKind::Flange => {
            let (r, h) = cylinder_size(shape, dims);
            Some((h, 2.0 * r))
        }
        ShapeKind::Tube => {
            let t = tube_size(dims);
            Some((t.height, 2.0 * t.outer_radius))
        }
        ShapeKind::Washer => {
            let w = washer_size(dims);
            Some((w.height, 2.0 * w.outer_radius))
        }
        ShapeKind::Bolt => {
            let b = bolt_size(dims);
            Some((b.length, b.diameter))
        }
        ShapeKind::Gear => {
            let g = gear_size(dims);
            Some((g.height, 2.0 * g.radius))
        }
        _ => None,
    }
}

/// Score a part against the DFM rules and pick a process.
pub fn analyze_dfm(
    shape: ShapeKind,
    dims: &DimensionSet,
    material: &Material,
    config: &DfmConfig,
) -> DfmReport {
    let mut warnings = Vec::new();

    if shape.is_plate_like() {
        let b = box_size(dims);
        if b.height < config.min_wall_mm {
            warnings.push(warning(
                DfmIssue::ThinWall,
                Severity::High,
                format!(
                    "Wall thickness {}mm is below the {}mm minimum",
                    b.height, config.min_wall_mm
                ),
                "Increase thickness to at least 2mm or add ribs",
            ));
        }
        let longest = b.length.max(b.width);
        if b.height > 0.0 && longest / b.height > config.max_aspect_ratio {
            warnings.push(warning(
                DfmIssue::AspectRatio,
                Severity::Medium,
                format!(
                    "Aspect ratio {:.1}:1 may warp during machining",
                    longest / b.height
                ),
                "Add stiffening features or increase thickness",
            ));
        }
    }

    if let Some((height, diameter)) = turned_proportions(shape, dims) {
        if diameter > 0.0 && height / diameter > config.max_depth_ratio {
            warnings.push(warning(
                DfmIssue::DeepFeature,
                Severity::Medium,
                format!(
                    "Length to diameter ratio {:.1}:1 needs steady rest support",
                    height / diameter
                ),
                "Shorten the part or support it during turning",
            ));
        }
    }

    if shape == ShapeKind::Gear {
        let gear = gear_size(dims);
        let pitch = gear.tooth_pitch();
        if pitch < config.min_tooth_pitch_mm {
            warnings.push(warning(
                DfmIssue::SmallFeatures,
                Severity::High,
                format!("Tooth pitch {:.2}mm is too fine to cut reliably", pitch),
                "Use fewer teeth or a larger diameter",
            ));
        }
        if material.machinability < config.gear_machinability_threshold {
            warnings.push(warning(
                DfmIssue::HardMaterialGear,
                Severity::Medium,
                format!(
                    "{} is hard to cut into gear teeth",
                    material.name
                ),
                "Consider steel or brass for gears",
            ));
        }
    }

    let penalty: u32 = warnings
        .iter()
        .map(|w| match w.severity {
            Severity::High => config.high_penalty,
            Severity::Medium => config.medium_penalty,
            Severity::Low => config.low_penalty,
        })
        .sum();
    let score = 100u32.saturating_sub(penalty);
    let recommended_process = recommend_process(shape, dims, material, config);

    debug!(
        "DFM for {}: score {}, {} warning(s), process {}",
        shape,
        score,
        warnings.len(),
        recommended_process
    );

    DfmReport {
        score,
        warnings,
        recommended_process,
    }
}

/// Pick a manufacturing process from material family, size and symmetry.
pub fn recommend_process(
    shape: ShapeKind,
    dims: &DimensionSet,
    material: &Material,
    config: &DfmConfig,
) -> String {
    let volume_cm3 = volume_mm3(shape, dims) / 1000.0;
    let process = if material.is_plastic() {
        "3D Printing (FDM)"
    } else if volume_cm3 < config.small_part_volume_cm3 {
        if material.machinability >= config.machinable_threshold {
            "CNC Milling"
        } else {
            "Wire EDM"
        }
    } else if shape.is_rotational() {
        "CNC Turning"
    } else {
        "CNC Milling"
    };
    process.to_string()
}
