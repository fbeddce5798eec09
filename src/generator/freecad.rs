//! FreeCAD Python script compiler.
//!
//! Translates a [`GeometryPlan`] into a script for `FreeCADCmd`. The script
//! builds every primitive, applies the operations in order, prints the result's
//! bounding box as `DIMENSION:<AXIS>:<mm>` lines, and exports the result to each
//! requested path. Any failure exits with status 1.

use super::script::{format_float, format_vector, py_ident, py_string, ScriptWriter};
use crate::model::{ExportKind, FormatKind, GeometryPlan, Operation, Primitive, PrimitiveKind};
use std::path::{Path, PathBuf};

/// Mesh tessellation tolerances for STL export.
const LINEAR_DEFLECTION: f64 = 0.1;
const ANGULAR_DEFLECTION: f64 = 0.5;

/// Compile a plan into a FreeCAD script exporting to `exports`.
pub fn compile_freecad_script(plan: &GeometryPlan, exports: &[(FormatKind, PathBuf)]) -> String {
    let mut w = ScriptWriter::new();

    w.write_line("import os");
    w.write_line("import sys");
    w.write_line("import FreeCAD");
    w.write_line("import Part");
    w.blank();
    w.assign("doc", "FreeCAD.newDocument(\"TextCadPart\")");
    w.log(&format!("Building {}", plan.shape));
    for note in &plan.notes {
        w.write_comment(note);
    }

    w.write_section("PRIMITIVES");
    for primitive in &plan.primitives {
        write_primitive(&mut w, primitive);
    }

    if !plan.operations.is_empty() {
        w.write_section("OPERATIONS");
        for op in &plan.operations {
            write_operation(&mut w, op);
        }
    }

    let result = py_ident(&plan.result);
    w.write_section("RESULT");
    w.write_line("doc.recompute()");
    w.open_block(&format!("if {}.Shape.isNull()", result));
    w.fail("Result shape is empty");
    w.close_block();
    w.assign("bbox", &format!("{}.Shape.BoundBox", result));
    write_bbox(&mut w, "bbox");

    if !exports.is_empty() {
        w.write_section("EXPORT");
        for (format, path) in exports {
            write_export(&mut w, &result, *format, &path.to_string_lossy());
        }
    }

    w.log("Done");
    w.take_output()
}

/// Compile a script that prints the bounding box of an exported file.
pub fn compile_measure_script(path: &Path) -> String {
    let mut w = ScriptWriter::new();
    w.write_line("import sys");
    w.write_line("import FreeCAD");
    w.write_line("import Part");
    w.blank();
    w.assign("path", &py_string(&path.to_string_lossy()));
    w.open_block("if path.lower().endswith(\".stl\")");
    w.write_line("import Mesh");
    w.assign("bbox", "Mesh.Mesh(path).BoundBox");
    w.close_block();
    w.open_block("else");
    w.assign("bbox", "Part.read(path).BoundBox");
    w.close_block();
    write_bbox(&mut w, "bbox");
    w.take_output()
}

fn write_bbox(w: &mut ScriptWriter, bbox: &str) {
    for (axis, attr) in [("LENGTH", "XLength"), ("WIDTH", "YLength"), ("HEIGHT", "ZLength")] {
        w.write_line(&format!("print(\"DIMENSION:{}:%.6f\" % {}.{})", axis, bbox, attr));
    }
}

fn write_primitive(w: &mut ScriptWriter, primitive: &Primitive) {
    let var = py_ident(&primitive.name);
    let label = py_string(&primitive.name);
    match &primitive.kind {
        PrimitiveKind::Box {
            length,
            width,
            height,
        } => {
            w.assign(&var, &format!("doc.addObject(\"Part::Box\", {})", label));
            w.assign(&format!("{}.Length", var), &format_float(*length));
            w.assign(&format!("{}.Width", var), &format_float(*width));
            w.assign(&format!("{}.Height", var), &format_float(*height));
        }
        PrimitiveKind::Cylinder { radius, height } => {
            w.assign(&var, &format!("doc.addObject(\"Part::Cylinder\", {})", label));
            w.assign(&format!("{}.Radius", var), &format_float(*radius));
            w.assign(&format!("{}.Height", var), &format_float(*height));
        }
        PrimitiveKind::Cone {
            radius1,
            radius2,
            height,
        } => {
            w.assign(&var, &format!("doc.addObject(\"Part::Cone\", {})", label));
            w.assign(&format!("{}.Radius1", var), &format_float(*radius1));
            w.assign(&format!("{}.Radius2", var), &format_float(*radius2));
            w.assign(&format!("{}.Height", var), &format_float(*height));
        }
        PrimitiveKind::Sphere { radius } => {
            w.assign(&var, &format!("doc.addObject(\"Part::Sphere\", {})", label));
            w.assign(&format!("{}.Radius", var), &format_float(*radius));
        }
        PrimitiveKind::Prism { points, height } => {
            let vertices: Vec<String> = points
                .iter()
                .map(|[x, y]| format_vector([*x, *y, 0.0]))
                .collect();
            w.assign(&format!("{}_points", var), &format!("[{}]", vertices.join(", ")));
            w.assign(
                &format!("{}_face", var),
                &format!("Part.Face(Part.makePolygon({}_points))", var),
            );
            w.assign(&var, &format!("doc.addObject(\"Part::Feature\", {})", label));
            w.assign(
                &format!("{}.Shape", var),
                &format!(
                    "{}_face.extrude({})",
                    var,
                    format_vector([0.0, 0.0, *height])
                ),
            );
        }
    }

    let placement = &primitive.placement;
    if placement.position != [0.0; 3] {
        w.assign(
            &format!("{}.Placement.Base", var),
            &format_vector(placement.position),
        );
    }
    if let Some(rotation) = placement.rotation {
        w.assign(
            &format!("{}.Placement.Rotation", var),
            &format!(
                "FreeCAD.Rotation({}, {})",
                format_vector(rotation.axis),
                format_float(rotation.degrees)
            ),
        );
    }
}

fn write_operation(w: &mut ScriptWriter, op: &Operation) {
    let var = py_ident(op.name());
    let label = py_string(op.name());
    match op {
        Operation::Cut { base, tool, .. } => {
            w.assign(&var, &format!("doc.addObject(\"Part::Cut\", {})", label));
            w.assign(&format!("{}.Base", var), &py_ident(base));
            w.assign(&format!("{}.Tool", var), &py_ident(tool));
        }
        Operation::Fuse { shapes, .. } => {
            let members: Vec<String> = shapes.iter().map(|s| py_ident(s)).collect();
            w.assign(&var, &format!("doc.addObject(\"Part::MultiFuse\", {})", label));
            w.assign(&format!("{}.Shapes", var), &format!("[{}]", members.join(", ")));
        }
        Operation::Fillet {
            source,
            radius,
            min_edge_length,
            ..
        } => write_edge_treatment(w, &var, &label, source, "makeFillet", *radius, *min_edge_length),
        Operation::Chamfer {
            source,
            size,
            min_edge_length,
            ..
        } => write_edge_treatment(w, &var, &label, source, "makeChamfer", *size, *min_edge_length),
    }
}

fn write_edge_treatment(
    w: &mut ScriptWriter,
    var: &str,
    label: &str,
    source: &str,
    method: &str,
    size: f64,
    min_edge_length: f64,
) {
    let source = py_ident(source);
    w.write_line("doc.recompute()");
    w.assign(
        &format!("{}_edges", var),
        &format!(
            "[e for e in {}.Shape.Edges if e.Length > {}]",
            source,
            format_float(min_edge_length)
        ),
    );
    w.assign(var, &format!("doc.addObject(\"Part::Feature\", {})", label));
    w.assign(
        &format!("{}.Shape", var),
        &format!(
            "{}.Shape.{}({}, {}_edges)",
            source,
            method,
            format_float(size),
            var
        ),
    );
}

fn write_export(w: &mut ScriptWriter, result: &str, format: FormatKind, path: &str) {
    let path = py_string(path);
    match format.kind() {
        ExportKind::Mesh => {
            w.write_line("import MeshPart");
            w.assign(
                "mesh",
                &format!(
                    "MeshPart.meshFromShape(Shape={}.Shape, LinearDeflection={}, AngularDeflection={})",
                    result,
                    format_float(LINEAR_DEFLECTION),
                    format_float(ANGULAR_DEFLECTION)
                ),
            );
            w.write_line(&format!("mesh.write({})", path));
        }
        ExportKind::Solid => {
            w.write_line(&format!("Part.export([{}], {})", result, path));
        }
    }
    w.open_block(&format!("if not os.path.exists({})", path));
    w.fail(&format!("Export to {} produced no file", format));
    w.close_block();
    w.write_line(&format!("print(\"EXPORTED:{}:\" + {})", format, path));
}
