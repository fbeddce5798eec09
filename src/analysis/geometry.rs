//! Closed-form volume, surface area and extents per shape.

use crate::config::{DEFAULT_HOLE_DIAMETER, GEAR_AREA_FACTOR, GEAR_FILL_FACTOR};
use crate::generator::sizing::*;
use crate::model::{DimensionSet, FeatureSpec, ShapeKind};
use std::f64::consts::PI;

fn disk_area(r: f64) -> f64 {
    PI * r * r
}

fn cylinder_volume(r: f64, h: f64) -> f64 {
    disk_area(r) * h
}

/// Closed cylinder surface.
fn cylinder_area(r: f64, h: f64) -> f64 {
    2.0 * disk_area(r) + 2.0 * PI * r * h
}

fn plate_holes(dims: &DimensionSet) -> (f64, f64) {
    let radius = dims.hole_diameter.unwrap_or(DEFAULT_HOLE_DIAMETER) / 2.0;
    let count = dims.hole_count.unwrap_or(1) as f64;
    (radius, count)
}

/// Part volume in mm³.
pub fn volume_mm3(shape: ShapeKind, dims: &DimensionSet) -> f64 {
    match shape {
        ShapeKind::Box => {
            let b = box_size(dims);
            b.length * b.width * b.height
        }
        ShapeKind::PlateWithHole => {
            let b = box_size(dims);
            let (r, n) = plate_holes(dims);
            (b.length * b.width * b.height - n * cylinder_volume(r, b.height)).max(0.0)
        }
        ShapeKind::Cylinder | ShapeKind::Piston => {
            let (r, h) = cylinder_size(shape, dims);
            cylinder_volume(r, h)
        }
        ShapeKind::Flange => {
            let f = flange_size(dims, &FeatureSpec::default());
            if !f.is_templated() {
                let (r, h) = cylinder_size(shape, dims);
                return cylinder_volume(r, h);
            }
            let bolts = if f.bolt_circle_radius.is_some() {
                f.bolt_count as f64 * cylinder_volume(f.bolt_hole_radius, f.height)
            } else {
                0.0
            };
            (cylinder_volume(f.outer_radius, f.height)
                - cylinder_volume(f.bore_radius.unwrap_or(0.0), f.height)
                - bolts)
                .max(0.0)
        }
        ShapeKind::Tube | ShapeKind::Washer => {
            let ring = if shape == ShapeKind::Tube {
                tube_size(dims)
            } else {
                washer_size(dims)
            };
            (cylinder_volume(ring.outer_radius, ring.height)
                - cylinder_volume(ring.inner_radius, ring.height))
            .max(0.0)
        }
        ShapeKind::Sphere => {
            let r = sphere_radius(dims);
            4.0 / 3.0 * PI * r.powi(3)
        }
        ShapeKind::Cone => {
            let (r1, r2, h) = cone_size(dims);
            PI * h / 3.0 * (r1 * r1 + r1 * r2 + r2 * r2)
        }
        ShapeKind::Gear => {
            let g = gear_size(dims);
            let hub = g.hub_radius.unwrap_or(0.0);
            (GEAR_FILL_FACTOR * cylinder_volume(g.radius, g.height) - cylinder_volume(hub, g.height))
                .max(0.0)
        }
        ShapeKind::Bolt => {
            let b = bolt_size(dims);
            cylinder_volume(b.head_radius(), b.head_height())
                + cylinder_volume(b.diameter / 2.0, b.length)
        }
        ShapeKind::Crankshaft => {
            let c = crankshaft_size(dims);
            2.0 * cylinder_volume(c.main_radius(), c.bearing_length())
                + cylinder_volume(c.pin_radius(), c.pin_length())
                + 2.0 * c.web_thickness() * c.throw() * c.main_radius() * 3.0
        }
        ShapeKind::Camshaft => {
            let c = camshaft_size(dims);
            cylinder_volume(c.shaft_radius(), c.length)
                + c.lobes as f64 * cylinder_volume(c.lobe_radius(), c.lobe_width())
        }
    }
}

/// Part surface area in mm².
pub fn surface_area_mm2(shape: ShapeKind, dims: &DimensionSet) -> f64 {
    match shape {
        ShapeKind::Box => {
            let b = box_size(dims);
            2.0 * (b.length * b.width + b.length * b.height + b.width * b.height)
        }
        ShapeKind::PlateWithHole => {
            let b = box_size(dims);
            let (r, n) = plate_holes(dims);
            2.0 * (b.length * b.width + b.length * b.height + b.width * b.height)
                + n * (2.0 * PI * r * b.height - 2.0 * disk_area(r))
        }
        ShapeKind::Cylinder | ShapeKind::Piston => {
            let (r, h) = cylinder_size(shape, dims);
            cylinder_area(r, h)
        }
        ShapeKind::Flange => {
            let f = flange_size(dims, &FeatureSpec::default());
            if !f.is_templated() {
                let (r, h) = cylinder_size(shape, dims);
                return cylinder_area(r, h);
            }
            let bore = f.bore_radius.unwrap_or(0.0);
            let bolts = if f.bolt_circle_radius.is_some() {
                f.bolt_count as f64
            } else {
                0.0
            };
            cylinder_area(f.outer_radius, f.height)
                + (2.0 * PI * bore * f.height - 2.0 * disk_area(bore))
                + bolts
                    * (2.0 * PI * f.bolt_hole_radius * f.height
                        - 2.0 * disk_area(f.bolt_hole_radius))
        }
        ShapeKind::Tube | ShapeKind::Washer => {
            let ring = if shape == ShapeKind::Tube {
                tube_size(dims)
            } else {
                washer_size(dims)
            };
            2.0 * (disk_area(ring.outer_radius) - disk_area(ring.inner_radius))
                + 2.0 * PI * (ring.outer_radius + ring.inner_radius) * ring.height
        }
        ShapeKind::Sphere => {
            let r = sphere_radius(dims);
            4.0 * PI * r * r
        }
        ShapeKind::Cone => {
            let (r1, r2, h) = cone_size(dims);
            let slant = ((r1 - r2).powi(2) + h * h).sqrt();
            disk_area(r1) + disk_area(r2) + PI * (r1 + r2) * slant
        }
        ShapeKind::Gear => {
            let g = gear_size(dims);
            cylinder_area(g.radius, g.height) * GEAR_AREA_FACTOR
        }
        ShapeKind::Bolt => {
            let b = bolt_size(dims);
            cylinder_area(b.head_radius(), b.head_height())
                + cylinder_area(b.diameter / 2.0, b.length)
                - 2.0 * disk_area(b.diameter / 2.0)
        }
        ShapeKind::Crankshaft => {
            let c = crankshaft_size(dims);
            let web = 2.0
                * (c.web_thickness() * c.throw()
                    + c.web_thickness() * c.main_radius() * 3.0
                    + c.throw() * c.main_radius() * 3.0);
            2.0 * cylinder_area(c.main_radius(), c.bearing_length())
                + cylinder_area(c.pin_radius(), c.pin_length())
                + 2.0 * web
        }
        ShapeKind::Camshaft => {
            let c = camshaft_size(dims);
            cylinder_area(c.shaft_radius(), c.length)
                + c.lobes as f64 * cylinder_area(c.lobe_radius(), c.lobe_width())
        }
    }
}

/// Expected bounding box (X, Y, Z) of the synthesized part.
///
/// Composite shafts report no expectation.
pub fn expected_extents(shape: ShapeKind, dims: &DimensionSet) -> [Option<f64>; 3] {
    let round = |r: f64, h: f64| [Some(2.0 * r), Some(2.0 * r), Some(h)];
    match shape {
        ShapeKind::Box | ShapeKind::PlateWithHole => {
            let b = box_size(dims);
            [Some(b.length), Some(b.width), Some(b.height)]
        }
        ShapeKind::Cylinder | ShapeKind::Piston => {
            let (r, h) = cylinder_size(shape, dims);
            round(r, h)
        }
        ShapeKind::Flange => {
            let f = flange_size(dims, &FeatureSpec::default());
            round(f.outer_radius, f.height)
        }
        ShapeKind::Tube => {
            let t = tube_size(dims);
            round(t.outer_radius, t.height)
        }
        ShapeKind::Washer => {
            let w = washer_size(dims);
            round(w.outer_radius, w.height)
        }
        ShapeKind::Sphere => {
            let r = sphere_radius(dims);
            round(r, 2.0 * r)
        }
        ShapeKind::Cone => {
            let (r, _, h) = cone_size(dims);
            round(r, h)
        }
        ShapeKind::Gear => {
            let g = gear_size(dims);
            round(g.radius, g.height)
        }
        ShapeKind::Bolt => {
            let b = bolt_size(dims);
            round(b.head_radius(), b.head_height() + b.length)
        }
        ShapeKind::Crankshaft | ShapeKind::Camshaft => [None; 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_dims(l: f64, w: f64, h: f64) -> DimensionSet {
        DimensionSet {
            length: Some(l),
            width: Some(w),
            height: Some(h),
            ..Default::default()
        }
    }

    #[test]
    fn test_box_volume_and_area() {
        let dims = box_dims(50.0, 50.0, 10.0);
        assert_eq!(volume_mm3(ShapeKind::Box, &dims), 25_000.0);
        assert_eq!(surface_area_mm2(ShapeKind::Box, &dims), 7_000.0);
    }

    #[test]
    fn test_plate_holes_remove_material() {
        let mut dims = box_dims(50.0, 50.0, 10.0);
        dims.hole_diameter = Some(5.0);
        dims.hole_count = Some(4);
        let plate = volume_mm3(ShapeKind::PlateWithHole, &dims);
        assert!((plate - (25_000.0 - 4.0 * PI * 6.25 * 10.0)).abs() < 1e-6);
    }

    #[test]
    fn test_gear_fill_factor() {
        let dims = DimensionSet {
            radius: Some(30.0),
            height: Some(10.0),
            ..Default::default()
        };
        let expected = 0.85 * PI * 900.0 * 10.0;
        assert!((volume_mm3(ShapeKind::Gear, &dims) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_tube_is_annulus() {
        let dims = DimensionSet {
            outer_diameter: Some(20.0),
            inner_diameter: Some(10.0),
            height: Some(10.0),
            ..Default::default()
        };
        let expected = PI * (100.0 - 25.0) * 10.0;
        assert!((volume_mm3(ShapeKind::Tube, &dims) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_every_shape_positive() {
        for shape in ShapeKind::ALL {
            let dims = DimensionSet::default();
            assert!(volume_mm3(shape, &dims) > 0.0, "{} volume", shape);
            assert!(surface_area_mm2(shape, &dims) > 0.0, "{} area", shape);
        }
    }

    #[test]
    fn test_expected_extents() {
        assert_eq!(
            expected_extents(ShapeKind::Box, &box_dims(100.0, 60.0, 5.0)),
            [Some(100.0), Some(60.0), Some(5.0)]
        );
        let sphere = DimensionSet {
            radius: Some(10.0),
            ..Default::default()
        };
        assert_eq!(
            expected_extents(ShapeKind::Sphere, &sphere),
            [Some(20.0), Some(20.0), Some(20.0)]
        );
        assert_eq!(expected_extents(ShapeKind::Camshaft, &sphere), [None; 3]);
    }
}
