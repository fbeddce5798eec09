//! Dimension adjustment before synthesis.

use super::fit::{apply_fit, is_known_fit};
use crate::config::float_cmp::approx_zero;
use crate::config::round_mm;
use crate::model::{DimensionSet, ShapeKind};
use tracing::debug;

/// Fold the requested fit deviation into the diameter and radius of a round
/// part.
///
/// Runs at most once per dimension set: the set is marked after the first call
/// and later calls return `None` without touching it. Returns the fit note when
/// a deviation was applied.
pub fn prepare_dimensions(shape: ShapeKind, dims: &mut DimensionSet) -> Option<String> {
    if dims.fit_applied {
        return None;
    }
    let code = dims.fit.clone()?;
    dims.fit_applied = true;

    if !shape.is_round() {
        debug!("Fit {} ignored for {} part", code, shape);
        return None;
    }
    if !is_known_fit(&code) {
        debug!("No deviation table for fit {}", code);
        return None;
    }

    dims.derive_radius_diameter();
    let nominal = dims.diameter?;
    let (delta, note) = apply_fit(nominal, &code);
    if approx_zero(delta) {
        debug!("No {} deviation for {}mm", code, nominal);
        return None;
    }

    dims.diameter = Some(round_mm(nominal + delta));
    dims.radius = dims.radius.map(|r| round_mm(r + delta / 2.0));
    debug!("Applied {} fit: {}", code, note);
    Some(note)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shaft(diameter: f64, fit: &str) -> DimensionSet {
        DimensionSet {
            diameter: Some(diameter),
            radius: Some(diameter / 2.0),
            fit: Some(fit.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_applies_once() {
        let mut dims = shaft(30.0, "H7");
        let note = prepare_dimensions(ShapeKind::Cylinder, &mut dims);
        assert_eq!(note.as_deref(), Some("Modeled at 30.0105mm (30mm H7 mean)"));
        assert_eq!(dims.radius, Some(15.00525));
        assert_eq!(dims.diameter, Some(30.0105));
        assert!(dims.fit_applied);

        let again = dims.clone();
        assert_eq!(prepare_dimensions(ShapeKind::Cylinder, &mut dims), None);
        assert_eq!(dims, again);
    }

    #[test]
    fn test_radius_only_is_derived() {
        let mut dims = DimensionSet {
            radius: Some(15.0),
            fit: Some("g6".to_string()),
            ..Default::default()
        };
        assert!(prepare_dimensions(ShapeKind::Cylinder, &mut dims).is_some());
        assert_eq!(dims.diameter, Some(29.987));
        assert_eq!(dims.radius, Some(14.9935));
    }

    #[test]
    fn test_box_untouched() {
        let mut dims = DimensionSet {
            length: Some(30.0),
            fit: Some("H7".to_string()),
            ..Default::default()
        };
        assert_eq!(prepare_dimensions(ShapeKind::Box, &mut dims), None);
        assert_eq!(dims.length, Some(30.0));
        assert!(dims.fit_applied);
    }

    #[test]
    fn test_no_fit_is_noop() {
        let mut dims = DimensionSet {
            diameter: Some(30.0),
            ..Default::default()
        };
        assert_eq!(prepare_dimensions(ShapeKind::Cylinder, &mut dims), None);
        assert!(!dims.fit_applied);
        assert_eq!(dims.radius, None);
    }

    #[test]
    fn test_out_of_bracket_keeps_size() {
        let mut dims = shaft(120.0, "H7");
        assert_eq!(prepare_dimensions(ShapeKind::Gear, &mut dims), None);
        assert_eq!(dims.diameter, Some(120.0));
    }

    #[test]
    fn test_unknown_fit_keeps_size() {
        let mut dims = shaft(30.0, "f7");
        assert_eq!(prepare_dimensions(ShapeKind::Cylinder, &mut dims), None);
        assert_eq!(dims.diameter, Some(30.0));
        assert!(dims.fit_applied);
    }
}
