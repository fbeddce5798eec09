//! Error types for the prompt-to-part pipeline.

use crate::model::ShapeKind;
use std::path::PathBuf;
use thiserror::Error;

/// Error codes for pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// File not found (-1)
    FileNotFound = -1,
    /// Configuration could not be loaded (-2)
    Config = -2,
    /// Serialization failure (-3)
    Serialization = -3,
    /// No dimensions in prompt (E100)
    ParseEmpty = 100,
    /// Unknown material name (E101)
    UnknownMaterial = 101,
    /// Invalid shape parameters (E200)
    Geometry = 200,
    /// Unsupported export format (E300)
    UnsupportedFormat = 300,
    /// Geometry kernel not installed (E301)
    KernelNotFound = 301,
    /// Kernel run failed (E302)
    Export = 302,
    /// Kernel run exceeded its time budget (E303)
    Timeout = 303,
}

/// Main error type for the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("No dimensions extracted from prompt")]
    ParseEmpty,

    #[error("Unknown material '{name}'")]
    UnknownMaterial { name: String },

    #[error("Invalid {shape} geometry: {parameter}: {message}")]
    Geometry {
        shape: ShapeKind,
        parameter: String,
        message: String,
    },

    #[error("Unsupported export format '{format}' (expected stl, step, stp, iges or igs)")]
    UnsupportedFormat { format: String },

    #[error("Geometry kernel not found (tried: {searched})")]
    KernelNotFound { searched: String },

    #[error("Export failed: {message}")]
    Export { message: String, diagnostic: String },

    #[error("Geometry kernel timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    /// Build a geometry error for one shape parameter.
    pub fn geometry(
        shape: ShapeKind,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        PipelineError::Geometry {
            shape,
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PipelineError::FileNotFound { .. } => ErrorCode::FileNotFound,
            PipelineError::Config { .. } => ErrorCode::Config,
            PipelineError::ParseEmpty => ErrorCode::ParseEmpty,
            PipelineError::UnknownMaterial { .. } => ErrorCode::UnknownMaterial,
            PipelineError::Geometry { .. } => ErrorCode::Geometry,
            PipelineError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            PipelineError::KernelNotFound { .. } => ErrorCode::KernelNotFound,
            PipelineError::Export { .. } => ErrorCode::Export,
            PipelineError::Timeout { .. } => ErrorCode::Timeout,
            PipelineError::Io(_) => ErrorCode::FileNotFound,
            PipelineError::Json(_) => ErrorCode::Serialization,
        }
    }

    /// Get the numeric error code value.
    pub fn code_value(&self) -> i32 {
        self.code() as i32
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PipelineError::ParseEmpty.code_value(), 100);
        assert_eq!(PipelineError::Timeout { seconds: 120 }.code(), ErrorCode::Timeout);
        let err = PipelineError::geometry(ShapeKind::Tube, "inner_diameter", "must be smaller");
        assert_eq!(err.code_value(), 200);
    }

    #[test]
    fn test_geometry_message() {
        let err = PipelineError::geometry(ShapeKind::Gear, "teeth", "must be at least 1");
        assert_eq!(err.to_string(), "Invalid gear geometry: teeth: must be at least 1");
    }
}
