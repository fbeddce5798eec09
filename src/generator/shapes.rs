//! Base body synthesis, one function per shape.

use super::features::{add_hole_tool, apply_holes, HoleFrame};
use super::gear::synthesize_gear;
use super::sizing::*;
use crate::config::{BORE_OVERSHOOT, DEFAULT_HOLE_DIAMETER};
use crate::error::{PipelineError, Result};
use crate::model::{
    DimensionSet, FeatureSpec, GeometryPlan, HoleOutcome, HolePlacement, HoleSpec, Placement,
    PrimitiveKind, ShapeKind,
};
use std::f64::consts::PI;

/// Y axis, used to lay shafts along X.
const Y_AXIS: [f64; 3] = [0.0, 1.0, 0.0];

/// A base body ready for the feature pass.
#[derive(Debug)]
pub(super) struct Body {
    pub plan: GeometryPlan,
    pub frame: HoleFrame,
    /// The shape cut the requested holes itself.
    pub holes_consumed: bool,
}

impl Body {
    fn new(plan: GeometryPlan, frame: HoleFrame) -> Self {
        Self {
            plan,
            frame,
            holes_consumed: false,
        }
    }
}

fn positive(shape: ShapeKind, parameter: &str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(PipelineError::geometry(
            shape,
            parameter,
            format!("must be positive, got {}", value),
        ))
    }
}

fn round_frame(radius: f64, pattern_radius: f64, height: f64) -> HoleFrame {
    HoleFrame::Round {
        radius,
        pattern_radius,
        z_min: 0.0,
        z_max: height,
    }
}

pub(super) fn synthesize_box(dims: &DimensionSet) -> Result<Body> {
    let size = box_size(dims);
    let shape = ShapeKind::Box;
    positive(shape, "length", size.length)?;
    positive(shape, "width", size.width)?;
    positive(shape, "height", size.height)?;

    let mut plan = GeometryPlan::new(shape);
    let base = plan.add_primitive(
        "Box",
        PrimitiveKind::Box {
            length: size.length,
            width: size.width,
            height: size.height,
        },
        Placement::origin(),
    );
    plan.set_result(base);
    Ok(Body::new(
        plan,
        HoleFrame::Rectangular {
            length: size.length,
            width: size.width,
            z_min: 0.0,
            z_max: size.height,
        },
    ))
}

/// Plate with its holes cut in; one 5 mm center hole when none were described.
pub(super) fn synthesize_plate_with_hole(dims: &DimensionSet, features: &FeatureSpec) -> Result<Body> {
    let mut body = synthesize_box(dims)?;
    body.plan.shape = ShapeKind::PlateWithHole;
    let default_hole = HoleSpec {
        count: 1,
        diameter: dims.hole_diameter.unwrap_or(DEFAULT_HOLE_DIAMETER),
        diameter_explicit: dims.hole_diameter.is_some(),
        placement: HolePlacement::Center,
        threaded: false,
        thread_size: None,
    };
    let holes = features.holes.as_ref().unwrap_or(&default_hole);
    apply_holes(&mut body.plan, &body.frame, holes)?;
    body.holes_consumed = true;
    Ok(body)
}

/// Cylinder, piston, or a flange without bore and bolt circle.
pub(super) fn synthesize_cylinder(shape: ShapeKind, dims: &DimensionSet) -> Result<Body> {
    let (radius, height) = cylinder_size(shape, dims);
    positive(shape, "radius", radius)?;
    positive(shape, "height", height)?;

    let name = match shape {
        ShapeKind::Piston => "Piston",
        ShapeKind::Flange => "Flange",
        _ => "Cylinder",
    };
    let mut plan = GeometryPlan::new(shape);
    let base = plan.add_primitive(
        name,
        PrimitiveKind::Cylinder { radius, height },
        Placement::origin(),
    );
    plan.set_result(base);
    Ok(Body::new(plan, round_frame(radius, radius * 0.6, height)))
}

pub(super) fn synthesize_flange(dims: &DimensionSet, features: &FeatureSpec) -> Result<Body> {
    let size = flange_size(dims, features);
    if !size.is_templated() {
        return synthesize_cylinder(ShapeKind::Flange, dims);
    }

    let shape = ShapeKind::Flange;
    let outer = positive(shape, "outer_diameter", size.outer_radius)?;
    let height = positive(shape, "height", size.height)?;
    let bore = size.bore_radius.unwrap_or(0.0);
    if bore >= outer {
        return Err(PipelineError::geometry(
            shape,
            "inner_diameter",
            format!(
                "bore {}mm must be smaller than outer diameter {}mm",
                bore * 2.0,
                outer * 2.0
            ),
        ));
    }
    if let Some(circle) = size.bolt_circle_radius {
        if circle <= bore || circle >= outer {
            return Err(PipelineError::geometry(
                shape,
                "bolt_circle_diameter",
                format!(
                    "{}mm must lie between bore {}mm and outer diameter {}mm",
                    circle * 2.0,
                    bore * 2.0,
                    outer * 2.0
                ),
            ));
        }
        if size.bolt_count == 0 {
            return Err(PipelineError::geometry(shape, "bolt_count", "must be at least 1"));
        }
        positive(shape, "hole_diameter", size.bolt_hole_radius)?;
    }

    let mut plan = GeometryPlan::new(shape);
    let disk = plan.add_primitive(
        "Disk",
        PrimitiveKind::Cylinder {
            radius: outer,
            height,
        },
        Placement::origin(),
    );
    plan.set_result(&disk);

    if bore > 0.0 {
        let tool = plan.add_primitive(
            "Bore",
            PrimitiveKind::Cylinder {
                radius: bore,
                height: height + 2.0 * BORE_OVERSHOOT,
            },
            Placement::at(0.0, 0.0, -BORE_OVERSHOOT),
        );
        let bored = plan.cut("Bored", &disk, &tool);
        plan.set_result(bored);
    }

    let mut holes_consumed = false;
    if let Some(circle) = size.bolt_circle_radius {
        let positions: Vec<[f64; 2]> = (0..size.bolt_count)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / size.bolt_count as f64;
                [circle * angle.cos(), circle * angle.sin()]
            })
            .collect();
        let base = plan.result.clone();
        if let Some(tool) = add_hole_tool(&mut plan, size.bolt_hole_radius, &positions, 0.0, height) {
            let result = plan.cut("Flange", &base, &tool);
            plan.set_result(result);
        }
        plan.features.holes = Some(HoleOutcome {
            diameter: size.bolt_hole_radius * 2.0,
            positions,
            thread: None,
        });
        plan.notes.push(format!(
            "{} x {}mm bolt holes on {}mm PCD",
            size.bolt_count,
            size.bolt_hole_radius * 2.0,
            circle * 2.0
        ));
        holes_consumed = true;
    }

    Ok(Body {
        plan,
        frame: round_frame(outer, (bore + outer) / 2.0, height),
        holes_consumed,
    })
}

pub(super) fn synthesize_sphere(dims: &DimensionSet) -> Result<Body> {
    let radius = positive(ShapeKind::Sphere, "radius", sphere_radius(dims))?;
    let mut plan = GeometryPlan::new(ShapeKind::Sphere);
    let base = plan.add_primitive("Sphere", PrimitiveKind::Sphere { radius }, Placement::origin());
    plan.set_result(base);
    Ok(Body::new(
        plan,
        HoleFrame::Round {
            radius,
            pattern_radius: radius * 0.5,
            z_min: -radius,
            z_max: radius,
        },
    ))
}

pub(super) fn synthesize_cone(dims: &DimensionSet) -> Result<Body> {
    let (radius1, radius2, height) = cone_size(dims);
    positive(ShapeKind::Cone, "radius", radius1)?;
    positive(ShapeKind::Cone, "height", height)?;

    let mut plan = GeometryPlan::new(ShapeKind::Cone);
    let base = plan.add_primitive(
        "Cone",
        PrimitiveKind::Cone {
            radius1,
            radius2,
            height,
        },
        Placement::origin(),
    );
    plan.set_result(base);
    Ok(Body::new(plan, round_frame(radius1, radius1 * 0.5, height)))
}

/// Outer cylinder minus an inner cylinder that overshoots both end faces.
fn synthesize_ring(shape: ShapeKind, name: &str, size: RingSize, dims: &DimensionSet) -> Result<Body> {
    positive(shape, "outer_diameter", size.outer_radius)?;
    positive(shape, "height", size.height)?;
    let inner_parameter = if dims.inner_diameter.is_none() && dims.wall_thickness.is_some() {
        "wall_thickness"
    } else {
        "inner_diameter"
    };
    positive(shape, inner_parameter, size.inner_radius)?;
    if size.inner_radius >= size.outer_radius {
        return Err(PipelineError::geometry(
            shape,
            inner_parameter,
            format!(
                "inner diameter {}mm must be smaller than outer diameter {}mm",
                size.inner_radius * 2.0,
                size.outer_radius * 2.0
            ),
        ));
    }

    let mut plan = GeometryPlan::new(shape);
    let outer = plan.add_primitive(
        "Outer",
        PrimitiveKind::Cylinder {
            radius: size.outer_radius,
            height: size.height,
        },
        Placement::origin(),
    );
    let inner = plan.add_primitive(
        "Inner",
        PrimitiveKind::Cylinder {
            radius: size.inner_radius,
            height: size.height + 2.0 * BORE_OVERSHOOT,
        },
        Placement::at(0.0, 0.0, -BORE_OVERSHOOT),
    );
    let result = plan.cut(name, &outer, &inner);
    plan.set_result(result);
    Ok(Body::new(
        plan,
        round_frame(
            size.outer_radius,
            (size.inner_radius + size.outer_radius) / 2.0,
            size.height,
        ),
    ))
}

pub(super) fn synthesize_tube(dims: &DimensionSet) -> Result<Body> {
    synthesize_ring(ShapeKind::Tube, "Tube", tube_size(dims), dims)
}

pub(super) fn synthesize_washer(dims: &DimensionSet) -> Result<Body> {
    synthesize_ring(ShapeKind::Washer, "Washer", washer_size(dims), dims)
}

pub(super) fn synthesize_bolt(dims: &DimensionSet) -> Result<Body> {
    let size = bolt_size(dims);
    let shape = ShapeKind::Bolt;
    positive(shape, "diameter", size.diameter)?;
    positive(shape, "length", size.length)?;

    let mut plan = GeometryPlan::new(shape);
    let head = plan.add_primitive(
        "Head",
        PrimitiveKind::Cylinder {
            radius: size.head_radius(),
            height: size.head_height(),
        },
        Placement::origin(),
    );
    let shaft = plan.add_primitive(
        "Shaft",
        PrimitiveKind::Cylinder {
            radius: size.diameter / 2.0,
            height: size.length,
        },
        Placement::at(0.0, 0.0, size.head_height()),
    );
    let result = plan.fuse("Bolt", vec![head, shaft]);
    plan.set_result(result);

    if let Some(pitch) = dims.thread_size.and_then(super::iso_coarse_pitch) {
        plan.notes.push(format!(
            "M{}x{} thread, {}mm shank",
            size.diameter, pitch, size.length
        ));
    }
    Ok(Body::new(plan, HoleFrame::Unsupported))
}

pub(super) fn synthesize_gear_body(dims: &DimensionSet) -> Result<Body> {
    let size = gear_size(dims);
    positive(ShapeKind::Gear, "radius", size.radius)?;
    positive(ShapeKind::Gear, "height", size.height)?;
    let plan = synthesize_gear(&size)?;
    let base = size.base_radius();
    let pattern_radius = match size.hub_radius {
        Some(hub) => (hub + base) / 2.0,
        None => base * 0.6,
    };
    Ok(Body::new(plan, round_frame(base, pattern_radius, size.height)))
}

/// Two main bearings, a crank pin at the throw, and two webs.
pub(super) fn synthesize_crankshaft(dims: &DimensionSet) -> Result<Body> {
    let size = crankshaft_size(dims);
    let shape = ShapeKind::Crankshaft;
    let length = positive(shape, "length", size.length)?;

    let mut plan = GeometryPlan::new(shape);
    let mut parts = Vec::new();
    for x in [-length * 0.3, length * 0.3] {
        parts.push(plan.add_primitive(
            "Bearing",
            PrimitiveKind::Cylinder {
                radius: size.main_radius(),
                height: size.bearing_length(),
            },
            Placement::at(x, 0.0, 0.0).rotated(Y_AXIS, 90.0),
        ));
    }
    parts.push(plan.add_primitive(
        "CrankPin",
        PrimitiveKind::Cylinder {
            radius: size.pin_radius(),
            height: size.pin_length(),
        },
        Placement::at(0.0, size.throw(), 0.0).rotated(Y_AXIS, 90.0),
    ));
    for x in [-length * 0.225, length * 0.075] {
        parts.push(plan.add_primitive(
            "Web",
            PrimitiveKind::Box {
                length: size.web_thickness(),
                width: size.throw(),
                height: size.main_radius() * 3.0,
            },
            Placement::at(x, 0.0, -size.main_radius() * 1.5),
        ));
    }
    let result = plan.fuse("Crankshaft", parts);
    plan.set_result(result);
    plan.notes.push(format!(
        "Crankshaft L={}mm throw={}mm (proportional placeholder)",
        length,
        size.throw()
    ));
    Ok(Body::new(plan, HoleFrame::Unsupported))
}

/// Shaft along X with lobes evenly spaced about its middle.
pub(super) fn synthesize_camshaft(dims: &DimensionSet) -> Result<Body> {
    let size = camshaft_size(dims);
    let shape = ShapeKind::Camshaft;
    positive(shape, "length", size.length)?;
    if size.lobes == 0 {
        return Err(PipelineError::geometry(shape, "lobes", "must be at least 1"));
    }

    let mut plan = GeometryPlan::new(shape);
    let mut parts = vec![plan.add_primitive(
        "Shaft",
        PrimitiveKind::Cylinder {
            radius: size.shaft_radius(),
            height: size.length,
        },
        Placement::origin().rotated(Y_AXIS, 90.0),
    )];
    for i in 0..size.lobes {
        parts.push(plan.add_primitive(
            "Lobe",
            PrimitiveKind::Cylinder {
                radius: size.lobe_radius(),
                height: size.lobe_width(),
            },
            Placement::at(
                size.lobe_position(i),
                size.lobe_radius() * 0.7,
                -size.shaft_radius() * 0.75,
            )
            .rotated(Y_AXIS, 90.0),
        ));
    }
    let result = plan.fuse("Camshaft", parts);
    plan.set_result(result);
    plan.notes.push(format!(
        "Camshaft L={}mm with {} lobes (proportional placeholder)",
        size.length, size.lobes
    ));
    Ok(Body::new(plan, HoleFrame::Unsupported))
}
