//! Integration tests for prompt to part processing.
//!
//! These run the whole pipeline on realistic prompts and check the structure of
//! the resulting plan, DFM report and quote rather than every intermediate value.

use pretty_assertions::assert_eq;
use textcad::analysis::DfmIssue;
use textcad::model::PrimitiveKind;
use textcad::{
    compile_freecad_script, process_prompt, EngineConfig, PartReport, PipelineError, ShapeKind,
};

fn run(prompt: &str) -> PartReport {
    process_prompt(prompt, None, &EngineConfig::default(), None)
        .unwrap_or_else(|e| panic!("{prompt:?} failed: {e}"))
}

fn run_with(prompt: &str, material: &str) -> PartReport {
    process_prompt(prompt, Some(material), &EngineConfig::default(), None)
        .unwrap_or_else(|e| panic!("{prompt:?} in {material} failed: {e}"))
}

// ==================== Plate tests ====================

#[test]
fn test_plain_plate() {
    let report = run("50x50x10 plate");

    assert_eq!(report.shape, ShapeKind::Box);
    assert_eq!(report.dimensions.length, Some(50.0));
    assert_eq!(report.dimensions.width, Some(50.0));
    assert_eq!(report.dimensions.height, Some(10.0));

    assert_eq!(report.plan.primitives.len(), 1);
    assert!(report.plan.operations.is_empty());
    assert_eq!(report.plan.result, "Box");

    assert_eq!(report.dfm.score, 100);
    assert!(report.dfm.warnings.is_empty());
    assert!(report.cost.total_cost > 0.0);
    assert_eq!(report.expected_extents, [Some(50.0), Some(50.0), Some(10.0)]);
}

#[test]
fn test_plate_with_center_hole_script() {
    let report = run("50x50x10 plate with 5mm center hole");
    assert_eq!(report.shape, ShapeKind::PlateWithHole);
    assert!(report.ambiguities.is_empty());

    let script = compile_freecad_script(&report.plan, &[]);
    insta::assert_snapshot!(script, @r###"
    import os
    import sys
    import FreeCAD
    import Part

    doc = FreeCAD.newDocument("TextCadPart")
    print("[TEXTCAD] Building plate_with_hole")

    # ===== PRIMITIVES =====
    Box = doc.addObject("Part::Box", "Box")
    Box.Length = 50.0
    Box.Width = 50.0
    Box.Height = 10.0
    Hole = doc.addObject("Part::Cylinder", "Hole")
    Hole.Radius = 2.5
    Hole.Height = 30.0
    Hole.Placement.Base = FreeCAD.Vector(25.0, 25.0, -10.0)

    # ===== OPERATIONS =====
    WithHoles = doc.addObject("Part::Cut", "WithHoles")
    WithHoles.Base = Box
    WithHoles.Tool = Hole

    # ===== RESULT =====
    doc.recompute()
    if WithHoles.Shape.isNull():
        print("[TEXTCAD] Result shape is empty")
        sys.exit(1)
    bbox = WithHoles.Shape.BoundBox
    print("DIMENSION:LENGTH:%.6f" % bbox.XLength)
    print("DIMENSION:WIDTH:%.6f" % bbox.YLength)
    print("DIMENSION:HEIGHT:%.6f" % bbox.ZLength)
    print("[TEXTCAD] Done")
    "###);
}

#[test]
fn test_plate_corner_holes() {
    let report = run("100x60x8 plate with 6mm holes in the corners");
    assert_eq!(report.shape, ShapeKind::PlateWithHole);

    let holes = report.plan.features.holes.as_ref().expect("holes cut");
    assert_eq!(holes.diameter, 6.0);
    assert_eq!(
        holes.positions,
        vec![[5.0, 5.0], [95.0, 5.0], [5.0, 55.0], [95.0, 55.0]]
    );
    assert_eq!(report.plan.result, "WithHoles");
    assert!(report.plan.is_well_formed());
}

#[test]
fn test_thin_wide_plate_penalized() {
    let report = run("100x100x1 plate");
    assert!(report.dfm.has(DfmIssue::ThinWall));
    assert!(report.dfm.has(DfmIssue::AspectRatio));
    assert_eq!(report.dfm.score, 65);
}

// ==================== Gear tests ====================

#[test]
fn test_gear_profile_and_pitch() {
    let report = run("gear 24 teeth 60mm diameter 10mm height");
    assert_eq!(report.shape, ShapeKind::Gear);
    assert_eq!(report.dimensions.teeth, Some(24));

    let gear = report.plan.primitive("Gear").expect("gear primitive");
    let PrimitiveKind::Prism { points, height } = &gear.kind else {
        panic!("gear is not a prism: {:?}", gear.kind);
    };
    assert_eq!(points.len(), 49);
    assert_eq!(*height, 10.0);
    assert_eq!(points.first(), points.last());

    let pitch = std::f64::consts::PI * 60.0 / 24.0;
    assert!((pitch - 7.85).abs() < 0.01);
    assert!(!report.dfm.has(DfmIssue::SmallFeatures));
}

#[test]
fn test_titanium_gear() {
    let report = run_with("gear 24 teeth 60mm diameter 10mm height", "titanium");
    assert_eq!(report.material, "titanium_ti6al4v");
    assert!(report.dfm.has(DfmIssue::HardMaterialGear));
    assert_eq!(report.dfm.recommended_process, "Wire EDM");
}

#[test]
fn test_fine_gear_small_features() {
    let report = run("gear 40 teeth 20mm diameter 5mm height");
    assert!(report.dfm.has(DfmIssue::SmallFeatures));
}

// ==================== Fit tests ====================

#[test]
fn test_shaft_with_h7_fit() {
    let report = run("30mm shaft H7");
    assert_eq!(report.shape, ShapeKind::Cylinder);
    assert_eq!(report.dimensions.radius, Some(15.00525));
    assert_eq!(report.dimensions.diameter, Some(30.0105));
    assert!(report.dimensions.fit_applied);
    assert_eq!(
        report.plan.notes.first().map(String::as_str),
        Some("Modeled at 30.0105mm (30mm H7 mean)")
    );
    assert_eq!(report.dfm.recommended_process, "CNC Milling");
}

// ==================== Rejection tests ====================

#[test]
fn test_no_dimensions_rejected() {
    let err = process_prompt("make something nice", None, &EngineConfig::default(), None)
        .unwrap_err();
    assert!(matches!(err, PipelineError::ParseEmpty));
    assert_eq!(err.to_string(), "No dimensions extracted from prompt");
}

#[test]
fn test_tube_inner_larger_than_outer() {
    let err = process_prompt(
        "tube 20mm outer diameter 30mm inner diameter",
        None,
        &EngineConfig::default(),
        None,
    )
    .unwrap_err();
    match err {
        PipelineError::Geometry {
            shape, parameter, ..
        } => {
            assert_eq!(shape, ShapeKind::Tube);
            assert_eq!(parameter, "inner_diameter");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ==================== Cost tests ====================

#[test]
fn test_cost_monotonic_in_length() {
    let costs: Vec<_> = ["20", "40", "80", "160", "160.01"]
        .iter()
        .map(|l| run(&format!("{l}x50x10 block")).cost)
        .collect();
    for pair in costs.windows(2) {
        assert!(pair[1].volume_cm3 > pair[0].volume_cm3, "{pair:?}");
        assert!(pair[1].material_cost > pair[0].material_cost, "{pair:?}");
        assert!(pair[1].total_cost > pair[0].total_cost, "{pair:?}");
    }
}

#[test]
fn test_price_breaks_scale_unit_total() {
    let report = run("50x50x10 plate");
    let breaks = &report.cost.quantity_price_breaks;
    assert_eq!(
        breaks.iter().map(|b| b.quantity).collect::<Vec<_>>(),
        vec![1, 10, 100, 1000]
    );
    assert_eq!(breaks[0].unit_price, report.cost.total_cost);
    assert!(breaks.windows(2).all(|w| w[0].unit_price > w[1].unit_price));
}

#[test]
fn test_plastic_is_printed() {
    let report = run_with("50x50x10 plate", "PLA");
    assert_eq!(report.dfm.recommended_process, "3D Printing (FDM)");
}

// ==================== Other shapes ====================

#[test]
fn test_bolt_shorthand() {
    let report = run("M8x40 bolt");
    assert_eq!(report.shape, ShapeKind::Bolt);
    assert_eq!(report.dimensions.diameter, Some(8.0));
    assert_eq!(report.dimensions.length, Some(40.0));
    assert_eq!(report.plan.result, "Bolt");
    assert!(report.plan.notes.iter().any(|n| n.starts_with("M8x1.25")));
}

#[test]
fn test_flange_on_bolt_circle() {
    let report = run("120mm flange with 4 bolt holes on a 90mm bolt circle");
    assert_eq!(report.shape, ShapeKind::Flange);
    assert_eq!(report.dimensions.diameter, Some(120.0));
    assert_eq!(report.dimensions.bolt_circle_diameter, Some(90.0));

    let holes = report.plan.features.holes.as_ref().expect("bolt holes");
    assert_eq!(holes.diameter, 10.0);
    assert_eq!(holes.positions.len(), 4);
    assert!(report.plan.is_well_formed());
}

#[test]
fn test_implausible_teeth_rejected() {
    let err = process_prompt(
        "gear with 3000000000 teeth",
        None,
        &EngineConfig::default(),
        None,
    )
    .unwrap_err();
    match err {
        PipelineError::Geometry {
            shape, parameter, ..
        } => {
            assert_eq!(shape, ShapeKind::Gear);
            assert_eq!(parameter, "teeth");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_assembly_detected() {
    let report = run("20mm shaft with a gear mounted on it");
    assert!(report.is_assembly);
    assert_eq!(report.components, vec!["shaft", "gear"]);
    assert!(!report.ambiguities.is_empty());
}

#[test]
fn test_report_serializes() {
    let report = run("40mm sphere");
    let json = serde_json::to_value(&report).expect("json");
    assert_eq!(json["shape"], "sphere");
    assert_eq!(json["dfm"]["score"], 100);
    assert!(json["cost"]["total_cost"].as_f64().unwrap_or_default() > 0.0);
}
