//! Dimensional accuracy of an exported part against its requested size.

use serde::{Deserialize, Serialize};

/// Axis names in bounding-box order.
const AXES: [&str; 3] = ["length", "width", "height"];

/// Comparison of one bounding-box axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisCheck {
    pub axis: String,
    pub expected_mm: f64,
    pub actual_mm: f64,
    pub error_mm: f64,
    pub error_percent: f64,
    pub within_tolerance: bool,
}

/// Result of an accuracy check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub valid: bool,
    pub tolerance_mm: f64,
    pub checks: Vec<AxisCheck>,
    pub message: String,
}

/// Compare expected extents with a measured bounding box (X, Y, Z lengths).
///
/// Axes with no expected value are not compared.
pub fn check_dimensional_accuracy(
    expected: [Option<f64>; 3],
    measured: [f64; 3],
    tolerance_mm: f64,
) -> AccuracyReport {
    let checks: Vec<AxisCheck> = AXES
        .iter()
        .zip(expected)
        .zip(measured)
        .filter_map(|((axis, expected), actual)| {
            let expected = expected?;
            let error = (expected - actual).abs();
            Some(AxisCheck {
                axis: axis.to_string(),
                expected_mm: expected,
                actual_mm: actual,
                error_mm: error,
                error_percent: if expected > 0.0 {
                    error / expected * 100.0
                } else {
                    0.0
                },
                within_tolerance: error < tolerance_mm,
            })
        })
        .collect();

    let valid = checks.iter().all(|c| c.within_tolerance);
    let message = if valid {
        "All dimensions within tolerance".to_string()
    } else {
        let off: Vec<&str> = checks
            .iter()
            .filter(|c| !c.within_tolerance)
            .map(|c| c.axis.as_str())
            .collect();
        format!("Outside tolerance: {}", off.join(", "))
    };

    AccuracyReport {
        valid,
        tolerance_mm,
        checks,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ACCURACY_TOLERANCE_MM;

    #[test]
    fn test_within_tolerance() {
        let report = check_dimensional_accuracy(
            [Some(50.0), Some(50.0), Some(10.0)],
            [50.004, 49.999, 10.0],
            ACCURACY_TOLERANCE_MM,
        );
        assert!(report.valid);
        assert_eq!(report.checks.len(), 3);
        assert_eq!(report.message, "All dimensions within tolerance");
    }

    #[test]
    fn test_outside_tolerance() {
        let report = check_dimensional_accuracy(
            [Some(50.0), Some(50.0), Some(10.0)],
            [50.0, 50.02, 10.0],
            ACCURACY_TOLERANCE_MM,
        );
        assert!(!report.valid);
        assert_eq!(report.message, "Outside tolerance: width");
        assert!(report.checks[1].error_percent > 0.0);
    }

    #[test]
    fn test_missing_axes_skipped() {
        let report = check_dimensional_accuracy([None, None, Some(5.0)], [1.0, 2.0, 5.0], 0.01);
        assert!(report.valid);
        assert_eq!(report.checks.len(), 1);
        assert_eq!(report.checks[0].axis, "height");
    }
}
