//! Typed dimension record extracted from a prompt.

use crate::config::round_mm;
use serde::{Deserialize, Serialize};

/// Unit-normalized dimensions of a requested part.
///
/// Every length is in millimeters, rounded to six decimals. A field is `None`
/// when the prompt never mentioned it; a present value of zero is still present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teeth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_diameter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillet_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chamfer_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_diameter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_diameter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wall_thickness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bolt_circle_diameter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bolt_count: Option<u32>,
    /// Number of holes recorded from the feature pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lobes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_size: Option<f64>,
    /// ISO fit class code such as `H7` or `g6`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<String>,
    /// Set once the fit deviation has been folded into radius/diameter.
    pub fit_applied: bool,
}

impl DimensionSet {
    /// Create an empty dimension set.
    pub fn new() -> Self {
        Self::default()
    }

    /// All length-valued fields with their names, present or not.
    fn length_fields(&self) -> [(&'static str, Option<f64>); 15] {
        [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
            ("diameter", self.diameter),
            ("radius", self.radius),
            ("hole_diameter", self.hole_diameter),
            ("fillet_radius", self.fillet_radius),
            ("chamfer_size", self.chamfer_size),
            ("tolerance", self.tolerance),
            ("outer_diameter", self.outer_diameter),
            ("inner_diameter", self.inner_diameter),
            ("thickness", self.thickness),
            ("wall_thickness", self.wall_thickness),
            ("bolt_circle_diameter", self.bolt_circle_diameter),
            ("thread_size", self.thread_size),
        ]
    }

    /// Present length values, in declaration order.
    pub fn lengths(&self) -> Vec<(&'static str, f64)> {
        self.length_fields()
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }

    /// Present count values.
    pub fn counts(&self) -> Vec<(&'static str, u32)> {
        [
            ("teeth", self.teeth),
            ("bolt_count", self.bolt_count),
            ("hole_count", self.hole_count),
            ("lobes", self.lobes),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }

    /// True when at least one numeric field holds a non-zero value.
    pub fn has_numeric_value(&self) -> bool {
        self.lengths().iter().any(|(_, v)| *v != 0.0) || self.counts().iter().any(|(_, v)| *v != 0)
    }

    /// Fill radius from diameter or diameter from radius, whichever is missing.
    ///
    /// Never overwrites a present value, so applying it twice is a no-op.
    pub fn derive_radius_diameter(&mut self) {
        match (self.radius, self.diameter) {
            (Some(r), None) => self.diameter = Some(round_mm(r * 2.0)),
            (None, Some(d)) => self.radius = Some(round_mm(d / 2.0)),
            _ => {}
        }
    }

    /// Use a stated thickness as the height when no height was given.
    pub fn derive_height_from_thickness(&mut self) {
        if self.height.is_none() {
            self.height = self.thickness;
        }
    }

    /// Set diameter and radius together.
    pub fn set_diameter(&mut self, diameter: f64) {
        self.diameter = Some(round_mm(diameter));
        self.radius = Some(round_mm(diameter / 2.0));
    }

    /// Effective outer diameter: `outer_diameter`, else `diameter`.
    pub fn outer(&self) -> Option<f64> {
        self.outer_diameter.or(self.diameter)
    }

    /// Fill every absent field from `other`. Present values are kept.
    pub fn fill_missing_from(&mut self, other: &DimensionSet) {
        macro_rules! fill {
            ($($field:ident),*) => {
                $(
                    if self.$field.is_none() {
                        self.$field = other.$field.clone();
                    }
                )*
            };
        }
        fill!(
            length,
            width,
            height,
            diameter,
            radius,
            teeth,
            hole_diameter,
            fillet_radius,
            chamfer_size,
            tolerance,
            outer_diameter,
            inner_diameter,
            thickness,
            wall_thickness,
            bolt_circle_diameter,
            bolt_count,
            hole_count,
            lobes,
            thread_size,
            fit
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_has_no_value() {
        let dims = DimensionSet::new();
        assert!(!dims.has_numeric_value());

        let zeros = DimensionSet {
            length: Some(0.0),
            teeth: Some(0),
            ..Default::default()
        };
        assert!(!zeros.has_numeric_value());
    }

    #[test]
    fn test_fit_alone_is_not_numeric() {
        let dims = DimensionSet {
            fit: Some("H7".to_string()),
            ..Default::default()
        };
        assert!(!dims.has_numeric_value());
    }

    #[test]
    fn test_derive_radius_idempotent() {
        let mut dims = DimensionSet {
            diameter: Some(25.0),
            ..Default::default()
        };
        dims.derive_radius_diameter();
        let once = dims.clone();
        dims.derive_radius_diameter();
        assert_eq!(dims, once);
        assert_eq!(dims.radius, Some(12.5));
    }

    #[test]
    fn test_derive_never_overwrites() {
        let mut dims = DimensionSet {
            radius: Some(4.0),
            diameter: Some(10.0),
            ..Default::default()
        };
        dims.derive_radius_diameter();
        assert_eq!(dims.radius, Some(4.0));
        assert_eq!(dims.diameter, Some(10.0));
    }

    #[test]
    fn test_thickness_becomes_height() {
        let mut dims = DimensionSet {
            thickness: Some(3.0),
            ..Default::default()
        };
        dims.derive_height_from_thickness();
        assert_eq!(dims.height, Some(3.0));

        let mut explicit = DimensionSet {
            thickness: Some(3.0),
            height: Some(0.0),
            ..Default::default()
        };
        explicit.derive_height_from_thickness();
        assert_eq!(explicit.height, Some(0.0));
    }

    #[test]
    fn test_fill_missing_keeps_present() {
        let mut dims = DimensionSet {
            length: Some(10.0),
            ..Default::default()
        };
        let other = DimensionSet {
            length: Some(99.0),
            width: Some(20.0),
            fit: Some("g6".to_string()),
            ..Default::default()
        };
        dims.fill_missing_from(&other);
        assert_eq!(dims.length, Some(10.0));
        assert_eq!(dims.width, Some(20.0));
        assert_eq!(dims.fit.as_deref(), Some("g6"));
    }

    #[test]
    fn test_serialize_skips_absent() {
        let dims = DimensionSet {
            length: Some(50.0),
            ..Default::default()
        };
        let json = serde_json::to_string(&dims).expect("serializes");
        assert_eq!(json, r#"{"length":50.0,"fit_applied":false}"#);
    }
}
