//! Effective part sizes: parsed values with shape defaults filled in.
//!
//! Synthesis, analysis and the accuracy check all read sizes through these
//! functions so the three always agree.

use crate::config::*;
use crate::model::{DimensionSet, FeatureSpec, ShapeKind};

/// Box or plate footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSize {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

pub fn box_size(dims: &DimensionSet) -> BoxSize {
    BoxSize {
        length: dims.length.unwrap_or(DEFAULT_BOX_LENGTH),
        width: dims.width.unwrap_or(DEFAULT_BOX_WIDTH),
        height: dims.height.unwrap_or(DEFAULT_BOX_HEIGHT),
    }
}

/// Radius from `radius`, else half the outer diameter.
fn radius_of(dims: &DimensionSet) -> Option<f64> {
    dims.radius.or_else(|| dims.outer().map(|d| d / 2.0))
}

/// Plain round body: (radius, height).
pub fn cylinder_size(shape: ShapeKind, dims: &DimensionSet) -> (f64, f64) {
    let (radius, height) = match shape {
        ShapeKind::Piston => (DEFAULT_PISTON_RADIUS, DEFAULT_PISTON_HEIGHT),
        _ => (DEFAULT_CYLINDER_RADIUS, DEFAULT_CYLINDER_HEIGHT),
    };
    (
        radius_of(dims).unwrap_or(radius),
        dims.height.or(dims.length).unwrap_or(height),
    )
}

pub fn sphere_radius(dims: &DimensionSet) -> f64 {
    radius_of(dims).unwrap_or(DEFAULT_SPHERE_RADIUS)
}

/// Cone: (base radius, top radius, height).
pub fn cone_size(dims: &DimensionSet) -> (f64, f64, f64) {
    (
        radius_of(dims).unwrap_or(DEFAULT_CONE_RADIUS),
        0.0,
        dims.height.or(dims.length).unwrap_or(DEFAULT_CONE_HEIGHT),
    )
}

/// Spur gear proportions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GearSize {
    pub radius: f64,
    pub height: f64,
    pub teeth: u32,
    pub hub_radius: Option<f64>,
}

impl GearSize {
    pub fn tooth_depth(&self) -> f64 {
        self.radius * GEAR_TOOTH_DEPTH_RATIO
    }

    pub fn base_radius(&self) -> f64 {
        self.radius - self.tooth_depth()
    }

    /// Circular pitch at the outer diameter (mm).
    pub fn tooth_pitch(&self) -> f64 {
        std::f64::consts::PI * self.radius * 2.0 / self.teeth.max(1) as f64
    }
}

pub fn gear_size(dims: &DimensionSet) -> GearSize {
    GearSize {
        radius: radius_of(dims).unwrap_or(DEFAULT_GEAR_RADIUS),
        height: dims.height.unwrap_or(DEFAULT_GEAR_HEIGHT),
        teeth: dims.teeth.unwrap_or(DEFAULT_GEAR_TEETH),
        hub_radius: dims.inner_diameter.map(|d| d / 2.0),
    }
}

/// Annular part: outer radius, inner radius, height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSize {
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub height: f64,
}

pub fn tube_size(dims: &DimensionSet) -> RingSize {
    let outer_radius = dims
        .outer_diameter
        .map(|d| d / 2.0)
        .or(dims.radius)
        .unwrap_or(DEFAULT_TUBE_OUTER_RADIUS);
    let inner_radius = dims
        .inner_diameter
        .map(|d| d / 2.0)
        .or_else(|| dims.wall_thickness.map(|w| outer_radius - w))
        .unwrap_or(outer_radius * DEFAULT_TUBE_INNER_RATIO);
    RingSize {
        outer_radius,
        inner_radius,
        height: dims.height.or(dims.length).unwrap_or(DEFAULT_TUBE_HEIGHT),
    }
}

/// Washer sizes. With a thread nominal M the proportions follow M; explicit
/// outer/inner/thickness values still win.
pub fn washer_size(dims: &DimensionSet) -> RingSize {
    let (outer, inner, thickness) = match dims.thread_size {
        Some(m) => (
            m * WASHER_OUTER_RATIO / 2.0,
            m * WASHER_INNER_RATIO / 2.0,
            m * WASHER_THICKNESS_RATIO,
        ),
        None => {
            let outer = dims
                .outer()
                .map(|d| d / 2.0)
                .unwrap_or(DEFAULT_WASHER_OUTER_DIAMETER / 2.0);
            (
                outer,
                outer * WASHER_INNER_RATIO / WASHER_OUTER_RATIO,
                DEFAULT_WASHER_THICKNESS,
            )
        }
    };
    RingSize {
        outer_radius: dims.outer_diameter.map(|d| d / 2.0).unwrap_or(outer),
        inner_radius: dims.inner_diameter.map(|d| d / 2.0).unwrap_or(inner),
        height: dims.height.unwrap_or(thickness),
    }
}

/// Hex-less bolt: cylindrical head on a plain shank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoltSize {
    pub diameter: f64,
    pub length: f64,
}

impl BoltSize {
    pub fn head_radius(&self) -> f64 {
        self.diameter * BOLT_HEAD_DIAMETER_RATIO / 2.0
    }

    pub fn head_height(&self) -> f64 {
        self.diameter * BOLT_HEAD_HEIGHT_RATIO
    }
}

/// Shank diameter from the thread nominal, unless a fit has already moved the
/// parsed diameter off it.
pub fn bolt_size(dims: &DimensionSet) -> BoltSize {
    let diameter = if dims.fit_applied {
        dims.diameter.or(dims.thread_size)
    } else {
        dims.thread_size.or(dims.diameter)
    };
    BoltSize {
        diameter: diameter.unwrap_or(DEFAULT_BOLT_DIAMETER),
        length: dims.length.or(dims.height).unwrap_or(DEFAULT_BOLT_LENGTH),
    }
}

/// Flange disk with optional bore and bolt circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlangeSize {
    pub outer_radius: f64,
    pub height: f64,
    pub bore_radius: Option<f64>,
    pub bolt_circle_radius: Option<f64>,
    pub bolt_count: u32,
    pub bolt_hole_radius: f64,
}

impl FlangeSize {
    /// Whether the flange needs more than a plain disk.
    pub fn is_templated(&self) -> bool {
        self.bore_radius.is_some() || self.bolt_circle_radius.is_some()
    }
}

pub fn flange_size(dims: &DimensionSet, features: &FeatureSpec) -> FlangeSize {
    let (outer_radius, height) = cylinder_size(ShapeKind::Flange, dims);
    let holes = features.holes.as_ref();
    let bolt_hole_diameter = holes
        .filter(|h| h.diameter_explicit)
        .map(|h| h.diameter)
        .or(dims.hole_diameter)
        .unwrap_or(DEFAULT_FLANGE_BOLT_HOLE_DIAMETER);
    FlangeSize {
        outer_radius: dims
            .outer_diameter
            .map(|d| d / 2.0)
            .unwrap_or(outer_radius),
        height,
        bore_radius: dims.inner_diameter.map(|d| d / 2.0),
        bolt_circle_radius: dims.bolt_circle_diameter.map(|d| d / 2.0),
        bolt_count: dims
            .bolt_count
            .or_else(|| holes.map(|h| h.count))
            .or(dims.hole_count)
            .unwrap_or(4),
        bolt_hole_radius: bolt_hole_diameter / 2.0,
    }
}

/// Crankshaft proportions derived from the overall length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrankshaftSize {
    pub length: f64,
}

impl CrankshaftSize {
    pub fn main_radius(&self) -> f64 {
        self.length / 20.0
    }

    pub fn pin_radius(&self) -> f64 {
        self.length / 15.0
    }

    pub fn throw(&self) -> f64 {
        self.length / 8.0
    }

    pub fn bearing_length(&self) -> f64 {
        self.length * 0.2
    }

    pub fn pin_length(&self) -> f64 {
        self.length * 0.15
    }

    pub fn web_thickness(&self) -> f64 {
        self.length * 0.15
    }
}

pub fn crankshaft_size(dims: &DimensionSet) -> CrankshaftSize {
    CrankshaftSize {
        length: dims
            .length
            .or(dims.height)
            .unwrap_or(DEFAULT_CRANKSHAFT_LENGTH),
    }
}

/// Camshaft proportions derived from the overall length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CamshaftSize {
    pub length: f64,
    pub lobes: u32,
}

impl CamshaftSize {
    pub fn shaft_radius(&self) -> f64 {
        self.length / 25.0
    }

    pub fn lobe_radius(&self) -> f64 {
        self.shaft_radius() * 2.0
    }

    pub fn lobe_width(&self) -> f64 {
        self.shaft_radius() * 1.5
    }

    /// Axial position of lobe `i`, lobes evenly spaced about the shaft middle.
    pub fn lobe_position(&self, i: u32) -> f64 {
        -self.length / 2.0 + self.length / (self.lobes + 1) as f64 * (i + 1) as f64
    }
}

pub fn camshaft_size(dims: &DimensionSet) -> CamshaftSize {
    CamshaftSize {
        length: dims.length.or(dims.height).unwrap_or(DEFAULT_CAMSHAFT_LENGTH),
        lobes: dims.lobes.or(dims.teeth).unwrap_or(DEFAULT_CAMSHAFT_LOBES),
    }
}
