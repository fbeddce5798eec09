//! Plausibility checks on extracted dimensions.

use crate::config::{MAX_PLAUSIBLE_MM, MIN_PLAUSIBLE_MM};
use crate::model::{DimensionSet, ShapeKind};
use crate::parser::classify_shape;
use serde::{Deserialize, Serialize};

/// Validation outcome with warnings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the dimensions can be used at all.
    pub valid: bool,
    /// Fatal problems.
    pub errors: Vec<String>,
    /// Suspicious but usable values.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a passing report.
    pub fn ok() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    /// Create a failing report with an error.
    pub fn error(message: impl Into<String>) -> Self {
        let mut report = Self::default();
        report.add_error(message);
        report
    }

    /// Add a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Add an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.valid = false;
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        if !other.valid {
            self.valid = false;
        }
    }
}

/// Validate extracted dimensions against the prompt they came from.
///
/// Only an empty dimension set is an error. Out-of-range values and missing
/// key dimensions are warnings; whether they justify an AI re-parse is up to
/// the caller (see [`needs_ai_reparse`]).
pub fn validate(dims: &DimensionSet, text: &str) -> ValidationReport {
    if !dims.has_numeric_value() {
        return ValidationReport::error("No dimensions extracted from prompt");
    }

    let mut report = ValidationReport::ok();

    for (name, value) in dims.lengths() {
        if value > MAX_PLAUSIBLE_MM {
            report.add_warning(format!("{}: {}mm seems very large. Check units.", name, value));
        }
        // Tolerances are legitimately tiny.
        if value < MIN_PLAUSIBLE_MM && name != "tolerance" {
            report.add_warning(format!("{}: {}mm seems very small. Check units.", name, value));
        }
    }

    report.merge(check_key_dimensions(dims, classify_shape(text)));
    report
}

/// Warn when a shape is missing the dimensions that define it.
fn check_key_dimensions(dims: &DimensionSet, shape: ShapeKind) -> ValidationReport {
    let mut report = ValidationReport::ok();
    match shape {
        ShapeKind::Box => {
            if dims.length.is_none() || dims.width.is_none() || dims.height.is_none() {
                report.add_warning("Box should have length, width, and height");
            }
        }
        ShapeKind::Cylinder | ShapeKind::Sphere => {
            if dims.radius.is_none() && dims.diameter.is_none() {
                report.add_warning(format!("{} should have radius or diameter", shape));
            }
        }
        _ => {}
    }
    report
}

/// Whether enough warnings accumulated to try an AI-assisted re-parse.
pub fn needs_ai_reparse(report: &ValidationReport, threshold: usize) -> bool {
    report.warnings.len() > threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract_dimensions;

    #[test]
    fn test_empty_is_invalid() {
        let report = validate(&DimensionSet::default(), "make something nice");
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["No dimensions extracted from prompt"]);
    }

    #[test]
    fn test_all_zero_is_invalid() {
        let dims = DimensionSet {
            length: Some(0.0),
            width: Some(0.0),
            ..Default::default()
        };
        assert!(!validate(&dims, "0x0 plate").valid);
    }

    #[test]
    fn test_complete_box_is_clean() {
        let text = "50x50x10 plate";
        let report = validate(&extract_dimensions(text), text);
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_box_missing_height_warns() {
        let text = "100x60 block";
        let report = validate(&extract_dimensions(text), text);
        assert!(report.valid);
        assert_eq!(report.warnings, vec!["Box should have length, width, and height"]);
    }

    #[test]
    fn test_cylinder_missing_diameter_warns() {
        let dims = DimensionSet {
            height: Some(40.0),
            ..Default::default()
        };
        let report = validate(&dims, "a cylinder 40 tall");
        assert_eq!(report.warnings, vec!["cylinder should have radius or diameter"]);
    }

    #[test]
    fn test_range_warnings() {
        let dims = DimensionSet {
            length: Some(20_000.0),
            width: Some(0.05),
            height: Some(10.0),
            tolerance: Some(0.01),
            ..Default::default()
        };
        let report = validate(&dims, "block");
        assert!(report.valid);
        assert_eq!(
            report.warnings,
            vec![
                "length: 20000mm seems very large. Check units.",
                "width: 0.05mm seems very small. Check units.",
            ]
        );
    }

    #[test]
    fn test_counts_exempt_from_range() {
        let dims = DimensionSet {
            diameter: Some(60.0),
            radius: Some(30.0),
            height: Some(10.0),
            teeth: Some(12_000),
            ..Default::default()
        };
        assert!(validate(&dims, "gear").warnings.is_empty());
    }

    #[test]
    fn test_needs_ai_reparse_threshold() {
        let mut report = ValidationReport::ok();
        report.add_warning("a");
        report.add_warning("b");
        assert!(!needs_ai_reparse(&report, 2));
        report.add_warning("c");
        assert!(needs_ai_reparse(&report, 2));
    }

    #[test]
    fn test_merge() {
        let mut report = ValidationReport::ok();
        report.merge(ValidationReport::error("bad"));
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["bad"]);
    }
}
