//! Configuration constants and settings for the pipeline.

use crate::error::{PipelineError, Result};
use crate::model::MaterialTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Floating-point comparison epsilon.
pub const EPS: f64 = 0.0001;

/// Decimal places kept on every extracted millimeter value.
pub const ROUNDING_DECIMALS: i32 = 6;

/// Smallest plausible engineering dimension (mm).
pub const MIN_PLAUSIBLE_MM: f64 = 0.1;

/// Largest plausible engineering dimension (mm).
pub const MAX_PLAUSIBLE_MM: f64 = 10_000.0;

/// Number of validation warnings above which an AI re-parse is worth trying.
pub const DEFAULT_AI_WARNING_THRESHOLD: usize = 2;

/// Largest count accepted for teeth, lobes, bolts or holes.
pub const MAX_FEATURE_COUNT: u32 = 1_000;

/// Teeth count used when a gear is requested without one.
pub const DEFAULT_GEAR_TEETH: u32 = 20;

/// Box defaults (mm).
pub const DEFAULT_BOX_LENGTH: f64 = 50.0;
pub const DEFAULT_BOX_WIDTH: f64 = 50.0;
pub const DEFAULT_BOX_HEIGHT: f64 = 10.0;

/// Cylinder defaults (mm).
pub const DEFAULT_CYLINDER_RADIUS: f64 = 10.0;
pub const DEFAULT_CYLINDER_HEIGHT: f64 = 50.0;

/// Piston defaults (mm).
pub const DEFAULT_PISTON_RADIUS: f64 = 30.0;
pub const DEFAULT_PISTON_HEIGHT: f64 = 80.0;

/// Sphere default radius (mm).
pub const DEFAULT_SPHERE_RADIUS: f64 = 20.0;

/// Cone defaults (mm).
pub const DEFAULT_CONE_RADIUS: f64 = 20.0;
pub const DEFAULT_CONE_HEIGHT: f64 = 50.0;

/// Gear defaults (mm).
pub const DEFAULT_GEAR_RADIUS: f64 = 30.0;
pub const DEFAULT_GEAR_HEIGHT: f64 = 10.0;

/// Gear tooth depth as a fraction of the outer radius.
pub const GEAR_TOOTH_DEPTH_RATIO: f64 = 0.15;

/// Gear volume fill factor relative to the enclosing cylinder.
pub const GEAR_FILL_FACTOR: f64 = 0.85;

/// Gear surface area inflation for tooth flanks.
pub const GEAR_AREA_FACTOR: f64 = 1.5;

/// Tube defaults (mm).
pub const DEFAULT_TUBE_OUTER_RADIUS: f64 = 10.0;
pub const DEFAULT_TUBE_HEIGHT: f64 = 50.0;

/// Inner radius of a tube as a fraction of the outer radius when unspecified.
pub const DEFAULT_TUBE_INNER_RATIO: f64 = 0.7;

/// How far the inner cutting cylinder overshoots each end face (mm).
pub const BORE_OVERSHOOT: f64 = 1.0;

/// Washer proportions relative to the thread nominal (ISO 7089 style).
pub const WASHER_INNER_RATIO: f64 = 1.05;
pub const WASHER_OUTER_RATIO: f64 = 2.0;
pub const WASHER_THICKNESS_RATIO: f64 = 0.2;

/// Washer defaults when no nominal size is known (mm).
pub const DEFAULT_WASHER_OUTER_DIAMETER: f64 = 16.0;
pub const DEFAULT_WASHER_THICKNESS: f64 = 1.6;

/// Bolt defaults (mm) and head proportions relative to the shaft diameter.
pub const DEFAULT_BOLT_DIAMETER: f64 = 8.0;
pub const DEFAULT_BOLT_LENGTH: f64 = 40.0;
pub const BOLT_HEAD_DIAMETER_RATIO: f64 = 1.8;
pub const BOLT_HEAD_HEIGHT_RATIO: f64 = 0.7;

/// Flange defaults (mm).
pub const DEFAULT_FLANGE_BOLT_HOLE_DIAMETER: f64 = 10.0;

/// Crankshaft/camshaft default overall lengths (mm).
pub const DEFAULT_CRANKSHAFT_LENGTH: f64 = 120.0;
pub const DEFAULT_CAMSHAFT_LENGTH: f64 = 100.0;
pub const DEFAULT_CAMSHAFT_LOBES: u32 = 4;

/// Hole defaults (mm).
pub const DEFAULT_HOLE_DIAMETER: f64 = 5.0;
pub const DEFAULT_THREAD_SIZE: f64 = 6.0;

/// Inset of corner/edge holes from the part boundary (mm).
pub const HOLE_EDGE_INSET: f64 = 5.0;

/// Extra length of hole cutting cylinders beyond the part, split over both ends (mm).
pub const HOLE_OVERSHOOT: f64 = 20.0;

/// Fillet/chamfer defaults (mm).
pub const DEFAULT_FILLET_RADIUS: f64 = 2.0;
pub const DEFAULT_CHAMFER_SIZE: f64 = 2.0;

/// Edges must be longer than this multiple of the fillet radius.
pub const FILLET_EDGE_FACTOR: f64 = 3.0;

/// Edges must be longer than this multiple of the chamfer size.
pub const CHAMFER_EDGE_FACTOR: f64 = 4.0;

/// Allowed deviation between expected and exported bounding box (mm).
pub const ACCURACY_TOLERANCE_MM: f64 = 0.01;

/// Default geometry kernel timeout.
pub const DEFAULT_KERNEL_TIMEOUT_SECS: u64 = 120;

/// Default material identifier.
pub const DEFAULT_MATERIAL: &str = "aluminum_6061";

/// Conversion factor: inch to mm.
pub const CONV_INCH_MM: f64 = 25.4;

/// Conversion factor: foot to mm.
pub const CONV_FOOT_MM: f64 = 304.8;

/// Unit of measurement found in a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    Millimeters,
    Centimeters,
    Meters,
    Inches,
    Feet,
}

impl Unit {
    /// Parse a unit token as written in a prompt.
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                Some(Unit::Millimeters)
            }
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                Some(Unit::Centimeters)
            }
            "m" | "meter" | "meters" | "metre" | "metres" => Some(Unit::Meters),
            "in" | "inch" | "inches" | "\"" => Some(Unit::Inches),
            "ft" | "foot" | "feet" | "'" => Some(Unit::Feet),
            _ => None,
        }
    }

    /// Get the conversion factor to convert from this unit to millimeters.
    pub fn to_mm_factor(&self) -> f64 {
        match self {
            Unit::Millimeters => 1.0,
            Unit::Centimeters => 10.0,
            Unit::Meters => 1000.0,
            Unit::Inches => CONV_INCH_MM,
            Unit::Feet => CONV_FOOT_MM,
        }
    }

    /// Convert a value in this unit to millimeters, rounded to the fixed granularity.
    pub fn to_mm(&self, value: f64) -> f64 {
        round_mm(value * self.to_mm_factor())
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unit::Millimeters => write!(f, "mm"),
            Unit::Centimeters => write!(f, "cm"),
            Unit::Meters => write!(f, "m"),
            Unit::Inches => write!(f, "inch"),
            Unit::Feet => write!(f, "ft"),
        }
    }
}

/// Round a millimeter value to six decimal places, half away from zero.
pub fn round_mm(value: f64) -> f64 {
    let scale = 10f64.powi(ROUNDING_DECIMALS);
    (value * scale).round() / scale
}

/// Penalties and thresholds for the DFM rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DfmConfig {
    /// Score deducted for a high-severity finding.
    pub high_penalty: u32,
    /// Score deducted for a medium-severity finding.
    pub medium_penalty: u32,
    /// Score deducted for a low-severity finding.
    pub low_penalty: u32,
    /// Minimum wall/plate thickness (mm).
    pub min_wall_mm: f64,
    /// Maximum planar dimension to thickness ratio.
    pub max_aspect_ratio: f64,
    /// Maximum height to diameter ratio for turned/gear parts.
    pub max_depth_ratio: f64,
    /// Minimum gear tooth pitch (mm).
    pub min_tooth_pitch_mm: f64,
    /// Machinability below which gear cutting is flagged.
    pub gear_machinability_threshold: f64,
    /// Volume below which a part counts as small (cm³).
    pub small_part_volume_cm3: f64,
    /// Machinability at or above which a small part is milled rather than EDM-cut.
    pub machinable_threshold: f64,
}

impl Default for DfmConfig {
    fn default() -> Self {
        Self {
            high_penalty: 25,
            medium_penalty: 10,
            low_penalty: 5,
            min_wall_mm: 2.0,
            max_aspect_ratio: 20.0,
            max_depth_ratio: 4.0,
            min_tooth_pitch_mm: 3.0,
            gear_machinability_threshold: 0.5,
            small_part_volume_cm3: 50.0,
            machinable_threshold: 0.5,
        }
    }
}

/// Rates used by the cost estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Shop hourly rate.
    pub hourly_rate: f64,
    /// Fixed setup cost per order.
    pub setup_cost: f64,
    /// Machining minutes per cm² of surface at complexity 1 and machinability 1.
    pub minutes_per_cm2: f64,
    /// Floor on machining time (minutes).
    pub min_machining_minutes: f64,
    /// (quantity, multiplier) tiers applied to the unit total.
    pub price_breaks: Vec<(u32, f64)>,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            hourly_rate: 75.0,
            setup_cost: 50.0,
            minutes_per_cm2: 0.2,
            min_machining_minutes: 5.0,
            price_breaks: vec![(1, 1.0), (10, 0.85), (100, 0.65), (1000, 0.45)],
        }
    }
}

/// External geometry kernel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Kernel executable; discovered from well-known locations when absent.
    pub command: Option<PathBuf>,
    /// Arguments placed before the script path.
    pub leading_args: Vec<String>,
    /// Directory receiving scripts and exported files.
    pub output_dir: PathBuf,
    /// Wall-clock bound on one kernel run (seconds).
    pub timeout_secs: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            command: None,
            leading_args: Vec::new(),
            output_dir: PathBuf::from("outputs"),
            timeout_secs: DEFAULT_KERNEL_TIMEOUT_SECS,
        }
    }
}

impl KernelConfig {
    /// Timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Complete engine configuration, injected into every stage that needs tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Material used when a request names none.
    pub default_material: String,
    /// Warnings count above which the AI fallback is consulted.
    pub ai_warning_threshold: usize,
    /// Teeth count for gears without one.
    pub default_gear_teeth: u32,
    /// Material catalogue.
    pub materials: MaterialTable,
    /// DFM rule settings.
    pub dfm: DfmConfig,
    /// Cost settings.
    pub cost: CostConfig,
    /// Kernel settings.
    pub kernel: KernelConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_material: DEFAULT_MATERIAL.to_string(),
            ai_warning_threshold: DEFAULT_AI_WARNING_THRESHOLD,
            default_gear_teeth: DEFAULT_GEAR_TEETH,
            materials: MaterialTable::default(),
            dfm: DfmConfig::default(),
            cost: CostConfig::default(),
            kernel: KernelConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| PipelineError::Config {
            message: format!("{}: {}", path.display(), e),
        })
    }
}

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    use super::EPS;

    /// Check if two floats are approximately equal.
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// Check if a float is approximately zero.
    #[inline]
    pub fn approx_zero(a: f64) -> bool {
        a.abs() < EPS
    }

    /// Check if a is in range [min, max] with epsilon tolerance.
    #[inline]
    pub fn in_range(a: f64, min: f64, max: f64) -> bool {
        a >= min - EPS && a <= max + EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_from_token() {
        assert_eq!(Unit::from_token("mm"), Some(Unit::Millimeters));
        assert_eq!(Unit::from_token("Inches"), Some(Unit::Inches));
        assert_eq!(Unit::from_token("\""), Some(Unit::Inches));
        assert_eq!(Unit::from_token("'"), Some(Unit::Feet));
        assert_eq!(Unit::from_token("cm"), Some(Unit::Centimeters));
        assert_eq!(Unit::from_token("furlong"), None);
    }

    #[test]
    fn test_unit_to_mm() {
        assert_eq!(Unit::Inches.to_mm(2.0), 50.8);
        assert_eq!(Unit::Feet.to_mm(1.0), 304.8);
        assert_eq!(Unit::Centimeters.to_mm(2.5), 25.0);
        assert_eq!(Unit::Meters.to_mm(0.05), 50.0);
        assert_eq!(Unit::Millimeters.to_mm(12.3456789), 12.345679);
    }

    #[test]
    fn test_round_mm() {
        assert_eq!(round_mm(0.1 + 0.2), 0.3);
        assert_eq!(round_mm(1.0000004), 1.0);
        assert_eq!(round_mm(-2.4999996), -2.5);
    }

    #[test]
    fn test_engine_config_partial_json() {
        let json = r#"{ "default_material": "steel_1018", "cost": { "hourly_rate": 90.0 } }"#;
        let config: EngineConfig = serde_json::from_str(json).expect("valid config");
        assert_eq!(config.default_material, "steel_1018");
        assert_eq!(config.cost.hourly_rate, 90.0);
        assert_eq!(config.cost.setup_cost, 50.0);
        assert_eq!(config.dfm, DfmConfig::default());
    }

    #[test]
    fn test_engine_config_missing_file() {
        let result = EngineConfig::from_json_file(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(PipelineError::FileNotFound { .. })));
    }
}
