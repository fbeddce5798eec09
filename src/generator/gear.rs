//! Procedural spur gear profile.

use super::sizing::GearSize;
use crate::error::{PipelineError, Result};
use crate::model::{GeometryPlan, Placement, PrimitiveKind, ShapeKind};
use crate::config::{BORE_OVERSHOOT, MAX_FEATURE_COUNT};
use std::f64::consts::PI;

/// Closed star-polygon outline of a gear with `teeth` teeth.
///
/// Produces `2 * teeth + 1` points. Even indices sit on the outer radius, odd
/// indices on the base radius, and the last point repeats the first.
pub fn gear_profile(radius: f64, base_radius: f64, teeth: u32) -> Vec<[f64; 2]> {
    let step = PI / teeth as f64;
    (0..=2 * teeth as usize)
        .map(|i| {
            let angle = i as f64 * step;
            let r = if i % 2 == 0 { radius } else { base_radius };
            [r * angle.cos(), r * angle.sin()]
        })
        .collect()
}

/// Gear body: extruded profile with an optional hub bore.
pub(super) fn synthesize_gear(size: &GearSize) -> Result<GeometryPlan> {
    if size.teeth == 0 {
        return Err(PipelineError::geometry(
            ShapeKind::Gear,
            "teeth",
            "gear needs at least one tooth",
        ));
    }
    if size.teeth > MAX_FEATURE_COUNT {
        return Err(PipelineError::geometry(
            ShapeKind::Gear,
            "teeth",
            format!("{} teeth exceeds the limit of {}", size.teeth, MAX_FEATURE_COUNT),
        ));
    }
    if let Some(hub) = size.hub_radius {
        if size.base_radius() <= hub {
            return Err(PipelineError::geometry(
                ShapeKind::Gear,
                "inner_diameter",
                format!(
                    "base radius {:.3}mm must exceed hub radius {:.3}mm",
                    size.base_radius(),
                    hub
                ),
            ));
        }
    }

    let mut plan = GeometryPlan::new(ShapeKind::Gear);
    let body = plan.add_primitive(
        "Gear",
        PrimitiveKind::Prism {
            points: gear_profile(size.radius, size.base_radius(), size.teeth),
            height: size.height,
        },
        Placement::origin(),
    );
    plan.set_result(&body);

    if let Some(hub) = size.hub_radius.filter(|r| *r > 0.0) {
        let bore = plan.add_primitive(
            "HubBore",
            PrimitiveKind::Cylinder {
                radius: hub,
                height: size.height + 2.0 * BORE_OVERSHOOT,
            },
            Placement::at(0.0, 0.0, -BORE_OVERSHOOT),
        );
        let result = plan.cut("GearWithHub", &body, &bore);
        plan.set_result(result);
    }

    Ok(plan)
}
