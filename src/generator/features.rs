//! Second synthesis pass: holes, threads, fillets and chamfers.

use crate::config::float_cmp::{approx_eq, in_range};
use crate::config::{
    CHAMFER_EDGE_FACTOR, DEFAULT_THREAD_SIZE, FILLET_EDGE_FACTOR, HOLE_EDGE_INSET, HOLE_OVERSHOOT,
    MAX_FEATURE_COUNT,
};
use crate::error::{PipelineError, Result};
use crate::model::{
    ChamferSpec, FeatureSpec, FilletSpec, GeometryPlan, HoleOutcome, HolePlacement, HoleSpec,
    Operation, Placement, PrimitiveKind, ThreadOutcome, TreatmentOutcome,
};
use std::collections::HashSet;
use std::f64::consts::PI;
use tracing::{debug, warn};

/// ISO 261 coarse pitch by nominal diameter (mm).
const ISO_COARSE_PITCH: &[(f64, f64)] = &[
    (2.0, 0.4),
    (3.0, 0.5),
    (4.0, 0.7),
    (5.0, 0.8),
    (6.0, 1.0),
    (8.0, 1.25),
    (10.0, 1.5),
    (12.0, 1.75),
    (16.0, 2.0),
    (20.0, 2.5),
    (24.0, 3.0),
    (30.0, 3.5),
    (36.0, 4.0),
    (42.0, 4.5),
    (48.0, 5.0),
    (56.0, 5.5),
    (64.0, 6.0),
];

/// Coarse pitch for a metric nominal size, if it is a standard size.
pub fn iso_coarse_pitch(nominal: f64) -> Option<f64> {
    ISO_COARSE_PITCH
        .iter()
        .find(|(size, _)| approx_eq(*size, nominal))
        .map(|(_, pitch)| *pitch)
}

/// Where holes can be drilled on a synthesized body, along +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum HoleFrame {
    /// Box footprint from the origin corner.
    Rectangular {
        length: f64,
        width: f64,
        z_min: f64,
        z_max: f64,
    },
    /// Round body centered on the Z axis. Patterns sit on `pattern_radius`.
    Round {
        radius: f64,
        pattern_radius: f64,
        z_min: f64,
        z_max: f64,
    },
    /// Composite bodies with no drilling face.
    Unsupported,
}

impl HoleFrame {
    fn z_range(&self) -> Option<(f64, f64)> {
        match *self {
            HoleFrame::Rectangular { z_min, z_max, .. } | HoleFrame::Round { z_min, z_max, .. } => {
                Some((z_min, z_max))
            }
            HoleFrame::Unsupported => None,
        }
    }

    /// Largest hole diameter the face can take.
    fn face_limit(&self) -> f64 {
        match *self {
            HoleFrame::Rectangular { length, width, .. } => length.min(width),
            HoleFrame::Round { radius, .. } => radius * 2.0,
            HoleFrame::Unsupported => 0.0,
        }
    }

    /// Whether a hole of `radius` centered at `center` lies within the face.
    fn contains(&self, center: [f64; 2], radius: f64) -> bool {
        let [x, y] = center;
        match *self {
            HoleFrame::Rectangular { length, width, .. } => {
                in_range(x - radius, 0.0, length)
                    && in_range(x + radius, 0.0, length)
                    && in_range(y - radius, 0.0, width)
                    && in_range(y + radius, 0.0, width)
            }
            HoleFrame::Round {
                radius: outer, ..
            } => in_range(x.hypot(y) + radius, 0.0, outer),
            HoleFrame::Unsupported => false,
        }
    }

    /// Hole centers for a placement policy.
    pub(super) fn positions(&self, placement: &HolePlacement, count: u32) -> Vec<[f64; 2]> {
        match (*self, placement) {
            (_, HolePlacement::At { x, y, .. }) => vec![[*x, *y]],
            (HoleFrame::Unsupported, _) => Vec::new(),
            (HoleFrame::Rectangular { length, width, .. }, placement) => {
                let e = HOLE_EDGE_INSET;
                match placement {
                    HolePlacement::Corners => vec![
                        [e, e],
                        [length - e, e],
                        [e, width - e],
                        [length - e, width - e],
                    ],
                    HolePlacement::Edges => vec![
                        [length / 2.0, e],
                        [length - e, width / 2.0],
                        [length / 2.0, width - e],
                        [e, width / 2.0],
                    ],
                    HolePlacement::Unspecified if count > 1 => (1..=count)
                        .map(|i| [length * i as f64 / (count as f64 + 1.0), width / 2.0])
                        .collect(),
                    _ => vec![[length / 2.0, width / 2.0]],
                }
            }
            (HoleFrame::Round { pattern_radius, .. }, placement) => {
                let on_circle = |n: u32, offset: f64| -> Vec<[f64; 2]> {
                    (0..n)
                        .map(|i| {
                            let angle = offset + 2.0 * PI * i as f64 / n as f64;
                            [pattern_radius * angle.cos(), pattern_radius * angle.sin()]
                        })
                        .collect()
                };
                match placement {
                    HolePlacement::Corners => on_circle(4, PI / 4.0),
                    HolePlacement::Edges => on_circle(4, 0.0),
                    HolePlacement::Unspecified if count > 1 => on_circle(count, 0.0),
                    _ => vec![[0.0, 0.0]],
                }
            }
        }
    }
}

/// Declare one cutting cylinder per position, fused into a single tool.
///
/// Returns the tool name, or `None` when there are no positions.
pub(super) fn add_hole_tool(
    plan: &mut GeometryPlan,
    radius: f64,
    positions: &[[f64; 2]],
    z_min: f64,
    z_max: f64,
) -> Option<String> {
    let half = HOLE_OVERSHOOT / 2.0;
    let holes: Vec<String> = positions
        .iter()
        .map(|[x, y]| {
            plan.add_primitive(
                "Hole",
                PrimitiveKind::Cylinder {
                    radius,
                    height: z_max - z_min + HOLE_OVERSHOOT,
                },
                Placement::at(*x, *y, z_min - half),
            )
        })
        .collect();

    match holes.len() {
        0 => None,
        1 => holes.into_iter().next(),
        _ => Some(plan.fuse("HoleCluster", holes)),
    }
}

/// Thread outcome for a threaded hole request.
fn thread_outcome(holes: &HoleSpec) -> Option<ThreadOutcome> {
    if !holes.threaded {
        return None;
    }
    let nominal = holes.thread_size.unwrap_or(DEFAULT_THREAD_SIZE);
    Some(match iso_coarse_pitch(nominal) {
        Some(pitch) => ThreadOutcome::Modeled { nominal, pitch },
        None => ThreadOutcome::PlainHole {
            reason: format!("No ISO coarse pitch for M{}", nominal),
        },
    })
}

/// Record thread callouts and warnings for a hole outcome.
pub(super) fn note_thread(plan: &mut GeometryPlan, outcome: &HoleOutcome) {
    match &outcome.thread {
        Some(ThreadOutcome::Modeled { nominal, pitch }) => plan.notes.push(format!(
            "M{}x{} thread, {} hole(s)",
            nominal,
            pitch,
            outcome.positions.len()
        )),
        Some(ThreadOutcome::PlainHole { reason }) => {
            plan.warnings.push(format!("{}; cut as a plain hole", reason))
        }
        None => {}
    }
}

/// Cut the requested holes into the current result.
pub(super) fn apply_holes(plan: &mut GeometryPlan, frame: &HoleFrame, holes: &HoleSpec) -> Result<()> {
    let Some((z_min, z_max)) = frame.z_range() else {
        warn!("Holes are not supported on {} parts", plan.shape);
        plan.warnings
            .push(format!("Holes are not supported on {} parts; skipped", plan.shape));
        return Ok(());
    };

    if holes.diameter <= 0.0 {
        return Err(PipelineError::geometry(
            plan.shape,
            "hole_diameter",
            format!("must be positive, got {}", holes.diameter),
        ));
    }
    if holes.count > MAX_FEATURE_COUNT {
        return Err(PipelineError::geometry(
            plan.shape,
            "hole_count",
            format!("{} holes exceeds the limit of {}", holes.count, MAX_FEATURE_COUNT),
        ));
    }
    if holes.diameter >= frame.face_limit() {
        return Err(PipelineError::geometry(
            plan.shape,
            "hole_diameter",
            format!(
                "{}mm hole does not fit a {}mm face",
                holes.diameter,
                frame.face_limit()
            ),
        ));
    }

    let positions = frame.positions(&holes.placement, holes.count);
    let radius = holes.diameter / 2.0;
    if let Some([x, y]) = positions.iter().find(|p| !frame.contains(**p, radius)) {
        return Err(PipelineError::geometry(
            plan.shape,
            "hole_position",
            format!(
                "{}mm hole at ({}, {}) does not lie inside the part",
                holes.diameter, x, y
            ),
        ));
    }
    let base = plan.result.clone();
    if let Some(tool) = add_hole_tool(plan, radius, &positions, z_min, z_max) {
        let result = plan.cut("WithHoles", &base, &tool);
        plan.set_result(result);
    }

    let outcome = HoleOutcome {
        diameter: holes.diameter,
        positions,
        thread: thread_outcome(holes),
    };
    note_thread(plan, &outcome);
    debug!("Cut {} hole(s) of {}mm", outcome.positions.len(), outcome.diameter);
    plan.features.holes = Some(outcome);
    Ok(())
}

/// Names of solids that only ever act as cutting tools.
fn tool_names(plan: &GeometryPlan) -> HashSet<&str> {
    let mut tools = HashSet::new();
    for op in plan.operations.iter().rev() {
        match op {
            Operation::Cut { tool, .. } => {
                tools.insert(tool.as_str());
            }
            Operation::Fuse { name, shapes } if tools.contains(name.as_str()) => {
                tools.extend(shapes.iter().map(String::as_str));
            }
            _ => {}
        }
    }
    tools
}

/// Approximate edge lengths of the planned solid.
///
/// Additive primitives contribute their own edges. Cutting tools contribute
/// only the circular edges they leave on the faces they pierce.
pub fn edge_lengths(plan: &GeometryPlan) -> Vec<f64> {
    let tools = tool_names(plan);
    let mut edges = Vec::new();
    for primitive in &plan.primitives {
        let is_tool = tools.contains(primitive.name.as_str());
        match &primitive.kind {
            PrimitiveKind::Box {
                length,
                width,
                height,
            } => {
                if !is_tool {
                    for e in [*length, *width, *height] {
                        edges.extend([e; 4]);
                    }
                }
            }
            PrimitiveKind::Cylinder { radius, height } => {
                edges.extend([2.0 * PI * radius; 2]);
                if !is_tool {
                    edges.push(*height);
                }
            }
            PrimitiveKind::Cone {
                radius1,
                radius2,
                height,
            } => {
                for r in [radius1, radius2] {
                    if *r > 0.0 {
                        edges.push(2.0 * PI * r);
                    }
                }
                if !is_tool {
                    edges.push(((radius1 - radius2).powi(2) + height.powi(2)).sqrt());
                }
            }
            PrimitiveKind::Sphere { radius } => {
                if !is_tool {
                    edges.push(PI * radius);
                }
            }
            PrimitiveKind::Prism { points, height } => {
                for pair in points.windows(2) {
                    let side = ((pair[1][0] - pair[0][0]).powi(2) + (pair[1][1] - pair[0][1]).powi(2))
                        .sqrt();
                    edges.extend([side; 2]);
                    if !is_tool {
                        edges.push(*height);
                    }
                }
            }
        }
    }
    edges
}

/// Apply a fillet to every edge longer than three radii, or skip it.
fn apply_fillet(plan: &mut GeometryPlan, fillet: &FilletSpec) {
    let min_edge_length = fillet.radius * FILLET_EDGE_FACTOR;
    let edges = qualifying_edges(plan, min_edge_length);
    let outcome = if fillet.radius <= 0.0 {
        TreatmentOutcome::Skipped {
            reason: format!("fillet radius {} is not positive", fillet.radius),
        }
    } else if edges == 0 {
        TreatmentOutcome::Skipped {
            reason: format!(
                "no edges longer than {}mm for a {}mm fillet",
                min_edge_length, fillet.radius
            ),
        }
    } else {
        let source = plan.result.clone();
        let result = plan.fillet(&source, fillet.radius, min_edge_length);
        plan.set_result(result);
        TreatmentOutcome::Applied {
            edges,
            min_edge_length,
        }
    };
    record_skip(plan, "Fillet", &outcome);
    plan.features.fillet = Some(outcome);
}

/// Apply a chamfer to every edge longer than four sizes, or skip it.
fn apply_chamfer(plan: &mut GeometryPlan, chamfer: &ChamferSpec) {
    let min_edge_length = chamfer.size * CHAMFER_EDGE_FACTOR;
    let edges = qualifying_edges(plan, min_edge_length);
    let outcome = if chamfer.size <= 0.0 {
        TreatmentOutcome::Skipped {
            reason: format!("chamfer size {} is not positive", chamfer.size),
        }
    } else if edges == 0 {
        TreatmentOutcome::Skipped {
            reason: format!(
                "no edges longer than {}mm for a {}mm chamfer",
                min_edge_length, chamfer.size
            ),
        }
    } else {
        let source = plan.result.clone();
        let result = plan.chamfer(&source, chamfer.size, min_edge_length);
        plan.set_result(result);
        TreatmentOutcome::Applied {
            edges,
            min_edge_length,
        }
    };
    record_skip(plan, "Chamfer", &outcome);
    plan.features.chamfer = Some(outcome);
}

fn qualifying_edges(plan: &GeometryPlan, min_edge_length: f64) -> usize {
    edge_lengths(plan)
        .into_iter()
        .filter(|e| *e > min_edge_length)
        .count()
}

fn record_skip(plan: &mut GeometryPlan, what: &str, outcome: &TreatmentOutcome) {
    if let TreatmentOutcome::Skipped { reason } = outcome {
        warn!("{} skipped: {}", what, reason);
        plan.warnings.push(format!("{} skipped: {}", what, reason));
    }
}

/// Run the feature pass over a synthesized base body.
///
/// Holes come first, then the fillet, then the chamfer. `holes_consumed` is set
/// by shapes that already cut the requested holes themselves.
pub(super) fn apply_features(
    plan: &mut GeometryPlan,
    frame: &HoleFrame,
    features: &FeatureSpec,
    holes_consumed: bool,
) -> Result<()> {
    if let Some(holes) = features.holes.as_ref().filter(|_| !holes_consumed) {
        apply_holes(plan, frame, holes)?;
    }
    if let Some(fillet) = &features.fillet {
        apply_fillet(plan, fillet);
    }
    if let Some(chamfer) = &features.chamfer {
        apply_chamfer(plan, chamfer);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;

    fn box_plan(length: f64, width: f64, height: f64) -> (GeometryPlan, HoleFrame) {
        let mut plan = GeometryPlan::new(ShapeKind::Box);
        let base = plan.add_primitive(
            "Base",
            PrimitiveKind::Box {
                length,
                width,
                height,
            },
            Placement::origin(),
        );
        plan.set_result(base);
        let frame = HoleFrame::Rectangular {
            length,
            width,
            z_min: 0.0,
            z_max: height,
        };
        (plan, frame)
    }

    fn holes(count: u32, diameter: f64, placement: HolePlacement) -> HoleSpec {
        HoleSpec {
            count,
            diameter,
            diameter_explicit: true,
            placement,
            threaded: false,
            thread_size: None,
        }
    }

    // ==================== Pitch tests ====================

    #[test]
    fn test_iso_pitch_table() {
        assert_eq!(iso_coarse_pitch(8.0), Some(1.25));
        assert_eq!(iso_coarse_pitch(64.0), Some(6.0));
        assert_eq!(iso_coarse_pitch(7.0), None);
    }

    // ==================== Hole tests ====================

    #[test]
    fn test_corner_positions() {
        let (_, frame) = box_plan(100.0, 80.0, 10.0);
        let positions = frame.positions(&HolePlacement::Corners, 4);
        assert_eq!(
            positions,
            vec![[5.0, 5.0], [95.0, 5.0], [5.0, 75.0], [95.0, 75.0]]
        );
    }

    #[test]
    fn test_unspecified_spreads_along_length() {
        let (_, frame) = box_plan(100.0, 40.0, 10.0);
        let positions = frame.positions(&HolePlacement::Unspecified, 3);
        assert_eq!(positions, vec![[25.0, 20.0], [50.0, 20.0], [75.0, 20.0]]);
    }

    #[test]
    fn test_round_center_hole() {
        let frame = HoleFrame::Round {
            radius: 20.0,
            pattern_radius: 12.0,
            z_min: 0.0,
            z_max: 5.0,
        };
        assert_eq!(frame.positions(&HolePlacement::Center, 1), vec![[0.0, 0.0]]);
        assert_eq!(frame.positions(&HolePlacement::Edges, 4).len(), 4);
    }

    #[test]
    fn test_holes_fused_then_cut_once() {
        let (mut plan, frame) = box_plan(50.0, 50.0, 10.0);
        apply_holes(&mut plan, &frame, &holes(4, 5.0, HolePlacement::Corners)).expect("holes");

        let cuts = plan
            .operations
            .iter()
            .filter(|op| matches!(op, Operation::Cut { .. }))
            .count();
        assert_eq!(cuts, 1);
        assert_eq!(plan.result, "WithHoles");
        assert!(plan.is_well_formed());

        let hole = plan.primitive("Hole").expect("hole");
        assert_eq!(hole.placement.position, [5.0, 5.0, -10.0]);
        assert_eq!(
            hole.kind,
            PrimitiveKind::Cylinder {
                radius: 2.5,
                height: 30.0
            }
        );
    }

    #[test]
    fn test_hole_larger_than_face() {
        let (mut plan, frame) = box_plan(20.0, 10.0, 5.0);
        let err = apply_holes(&mut plan, &frame, &holes(1, 12.0, HolePlacement::Center)).unwrap_err();
        assert!(matches!(err, PipelineError::Geometry { .. }));
    }

    #[test]
    fn test_explicit_position_outside_face() {
        let (mut plan, frame) = box_plan(50.0, 50.0, 10.0);
        let spec = holes(1, 5.0, HolePlacement::At { x: 500.0, y: 500.0, z: None });
        match apply_holes(&mut plan, &frame, &spec).unwrap_err() {
            PipelineError::Geometry { parameter, .. } => assert_eq!(parameter, "hole_position"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(plan.operations.is_empty());
        assert!(plan.features.holes.is_none());
    }

    #[test]
    fn test_explicit_position_inside_face() {
        let (mut plan, frame) = box_plan(50.0, 50.0, 10.0);
        let spec = holes(1, 5.0, HolePlacement::At { x: 10.0, y: 40.0, z: None });
        apply_holes(&mut plan, &frame, &spec).expect("holes");
        assert_eq!(plan.features.holes.map(|h| h.positions), Some(vec![[10.0, 40.0]]));
    }

    #[test]
    fn test_corner_holes_overhang_small_face() {
        let (mut plan, frame) = box_plan(20.0, 20.0, 5.0);
        let err = apply_holes(&mut plan, &frame, &holes(4, 12.0, HolePlacement::Corners)).unwrap_err();
        assert!(err.to_string().contains("hole_position"));
    }

    #[test]
    fn test_round_pattern_outside_rim() {
        let frame = HoleFrame::Round {
            radius: 10.0,
            pattern_radius: 6.0,
            z_min: 0.0,
            z_max: 5.0,
        };
        let mut plan = GeometryPlan::new(ShapeKind::Cylinder);
        plan.set_result("Cylinder");
        let err = apply_holes(&mut plan, &frame, &holes(4, 9.0, HolePlacement::Edges)).unwrap_err();
        assert!(err.to_string().contains("hole_position"));
        apply_holes(&mut plan, &frame, &holes(4, 6.0, HolePlacement::Edges)).expect("fits");
    }

    #[test]
    fn test_implausible_hole_count() {
        let (mut plan, frame) = box_plan(50.0, 50.0, 10.0);
        let err = apply_holes(&mut plan, &frame, &holes(u32::MAX, 1.0, HolePlacement::Unspecified))
            .unwrap_err();
        assert!(err.to_string().contains("hole_count"));
    }

    #[test]
    fn test_threaded_hole_outcome() {
        let (mut plan, frame) = box_plan(50.0, 50.0, 10.0);
        let mut spec = holes(1, 8.0, HolePlacement::Center);
        spec.threaded = true;
        spec.thread_size = Some(8.0);
        apply_holes(&mut plan, &frame, &spec).expect("holes");
        let outcome = plan.features.holes.expect("outcome");
        assert_eq!(
            outcome.thread,
            Some(ThreadOutcome::Modeled {
                nominal: 8.0,
                pitch: 1.25
            })
        );
        assert_eq!(plan.notes, vec!["M8x1.25 thread, 1 hole(s)"]);
    }

    #[test]
    fn test_nonstandard_thread_is_plain_hole() {
        let (mut plan, frame) = box_plan(50.0, 50.0, 10.0);
        let mut spec = holes(1, 7.0, HolePlacement::Center);
        spec.threaded = true;
        spec.thread_size = Some(7.0);
        apply_holes(&mut plan, &frame, &spec).expect("holes");
        assert!(matches!(
            plan.features.holes.and_then(|h| h.thread),
            Some(ThreadOutcome::PlainHole { .. })
        ));
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn test_unsupported_frame_warns() {
        let mut plan = GeometryPlan::new(ShapeKind::Crankshaft);
        plan.set_result("Crankshaft");
        apply_holes(&mut plan, &HoleFrame::Unsupported, &holes(1, 5.0, HolePlacement::Center))
            .expect("skip");
        assert!(plan.operations.is_empty());
        assert_eq!(plan.warnings.len(), 1);
    }

    // ==================== Edge treatment tests ====================

    #[test]
    fn test_box_edges() {
        let (plan, _) = box_plan(50.0, 40.0, 10.0);
        let edges = edge_lengths(&plan);
        assert_eq!(edges.len(), 12);
        assert_eq!(edges.iter().filter(|e| **e == 10.0).count(), 4);
    }

    #[test]
    fn test_fillet_applied() {
        let (mut plan, frame) = box_plan(50.0, 50.0, 10.0);
        let features = FeatureSpec {
            fillet: Some(FilletSpec { radius: 2.0 }),
            ..Default::default()
        };
        apply_features(&mut plan, &frame, &features, false).expect("features");
        assert_eq!(
            plan.features.fillet,
            Some(TreatmentOutcome::Applied {
                edges: 12,
                min_edge_length: 6.0
            })
        );
        assert_eq!(plan.result, "Filleted");
    }

    #[test]
    fn test_fillet_skipped_when_no_edge_qualifies() {
        let (mut plan, frame) = box_plan(10.0, 10.0, 5.0);
        let features = FeatureSpec {
            fillet: Some(FilletSpec { radius: 5.0 }),
            ..Default::default()
        };
        apply_features(&mut plan, &frame, &features, false).expect("features");
        assert!(matches!(
            plan.features.fillet,
            Some(TreatmentOutcome::Skipped { .. })
        ));
        assert_eq!(plan.result, "Base");
        assert!(plan.operations.is_empty());
        assert_eq!(plan.warnings.len(), 1);
    }

    #[test]
    fn test_chamfer_after_fillet() {
        let (mut plan, frame) = box_plan(50.0, 50.0, 10.0);
        let features = FeatureSpec {
            fillet: Some(FilletSpec { radius: 1.0 }),
            chamfer: Some(ChamferSpec {
                size: 1.0,
                angle_degrees: 45.0,
            }),
            ..Default::default()
        };
        apply_features(&mut plan, &frame, &features, false).expect("features");
        let names: Vec<&str> = plan.operations.iter().map(|op| op.name()).collect();
        assert_eq!(names, vec!["Filleted", "Chamfered"]);
        assert_eq!(plan.result, "Chamfered");
    }

    #[test]
    fn test_consumed_holes_not_recut() {
        let (mut plan, frame) = box_plan(50.0, 50.0, 10.0);
        let features = FeatureSpec {
            holes: Some(holes(1, 5.0, HolePlacement::Center)),
            ..Default::default()
        };
        apply_features(&mut plan, &frame, &features, true).expect("features");
        assert!(plan.operations.is_empty());
    }
}
