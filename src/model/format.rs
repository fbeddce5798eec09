//! Export formats understood by the geometry kernel.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the kernel writes a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// Tessellated triangle mesh.
    Mesh,
    /// Exact boundary representation.
    Solid,
}

/// Interchange format of an exported part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Stl,
    Step,
    Stp,
    Iges,
    Igs,
}

impl FormatKind {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatKind::Stl => "stl",
            FormatKind::Step => "step",
            FormatKind::Stp => "stp",
            FormatKind::Iges => "iges",
            FormatKind::Igs => "igs",
        }
    }

    pub fn kind(&self) -> ExportKind {
        match self {
            FormatKind::Stl => ExportKind::Mesh,
            _ => ExportKind::Solid,
        }
    }
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for FormatKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "stl" => Ok(FormatKind::Stl),
            "step" => Ok(FormatKind::Step),
            "stp" => Ok(FormatKind::Stp),
            "iges" => Ok(FormatKind::Iges),
            "igs" => Ok(FormatKind::Igs),
            _ => Err(PipelineError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}
