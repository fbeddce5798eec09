//! Auxiliary features requested on top of the base solid.

use serde::{Deserialize, Serialize};

/// Where holes go on the part.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum HolePlacement {
    /// A hole was asked for without saying where.
    #[default]
    Unspecified,
    Center,
    Corners,
    Edges,
    /// Explicit coordinates in the part frame.
    At { x: f64, y: f64, z: Option<f64> },
}

/// Hole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleSpec {
    pub count: u32,
    /// Hole diameter (mm).
    pub diameter: f64,
    /// Whether the diameter was written in the prompt.
    pub diameter_explicit: bool,
    pub placement: HolePlacement,
    pub threaded: bool,
    /// Metric nominal size, e.g. 8 for M8.
    pub thread_size: Option<f64>,
}

/// Fillet request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilletSpec {
    pub radius: f64,
}

/// Chamfer request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChamferSpec {
    pub size: f64,
    pub angle_degrees: f64,
}

/// All auxiliary features detected in a prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holes: Option<HoleSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillet: Option<FilletSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chamfer: Option<ChamferSpec>,
}

impl FeatureSpec {
    pub fn is_empty(&self) -> bool {
        self.holes.is_none() && self.fillet.is_none() && self.chamfer.is_none()
    }
}

/// Result of an edge treatment (fillet or chamfer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TreatmentOutcome {
    Applied { edges: usize, min_edge_length: f64 },
    Skipped { reason: String },
}

/// Result of a threaded-hole request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThreadOutcome {
    /// Thread recorded with its ISO coarse pitch.
    Modeled { nominal: f64, pitch: f64 },
    /// No pitch available; the hole is cut plain.
    PlainHole { reason: String },
}

/// What the hole pass actually cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleOutcome {
    pub diameter: f64,
    /// Hole centers in the part frame.
    pub positions: Vec<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadOutcome>,
}

/// Outcomes of the feature pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureOutcomes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holes: Option<HoleOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillet: Option<TreatmentOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chamfer: Option<TreatmentOutcome>,
}
