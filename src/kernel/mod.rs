//! External geometry kernel boundary.

mod freecad;

pub use freecad::FreeCadKernel;

use crate::error::Result;
use crate::model::{FormatKind, GeometryPlan};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Files written by one export request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifacts {
    pub request_id: String,
    pub script_path: PathBuf,
    pub files: BTreeMap<FormatKind, PathBuf>,
    /// Bounding box of the built solid as reported by the kernel (X, Y, Z).
    pub bounding_box: Option<[f64; 3]>,
    /// Captured kernel standard output.
    pub stdout: String,
}

/// A geometry kernel that can build a plan and read back exported files.
pub trait GeometryKernel {
    /// Build `plan` and export it once per format. Artifact names derive from
    /// `request_id`.
    fn export(
        &self,
        plan: &GeometryPlan,
        formats: &[FormatKind],
        request_id: &str,
    ) -> Result<ExportArtifacts>;

    /// Bounding box (X, Y, Z lengths in mm) of an exported file.
    fn measure_bounding_box(&self, path: &Path) -> Result<[f64; 3]>;
}

/// Fresh request identifier for artifact names.
pub fn new_request_id() -> String {
    ulid::Ulid::new().to_string().to_lowercase()
}

/// Read `DIMENSION:<AXIS>:<mm>` lines from kernel output.
///
/// Returns `None` unless all three axes are present.
pub fn parse_dimension_lines(output: &str) -> Option<[f64; 3]> {
    let mut bbox = [None; 3];
    for line in output.lines() {
        let Some(rest) = line.trim().strip_prefix("DIMENSION:") else {
            continue;
        };
        let Some((axis, value)) = rest.split_once(':') else {
            continue;
        };
        let index = match axis {
            "LENGTH" => 0,
            "WIDTH" => 1,
            "HEIGHT" => 2,
            _ => continue,
        };
        if let Ok(value) = value.trim().parse::<f64>() {
            bbox[index] = Some(value);
        }
    }
    Some([bbox[0]?, bbox[1]?, bbox[2]?])
}
