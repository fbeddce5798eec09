//! Cost estimation from material, volume and machining time.

use super::geometry::{surface_area_mm2, volume_mm3};
use crate::config::CostConfig;
use crate::model::{DimensionSet, Material, ShapeKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Unit and order price at one quantity tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreak {
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Itemized single-part estimate.
///
/// Values are kept at full precision; round them when presenting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub material: String,
    pub material_cost: f64,
    pub machining_time_minutes: f64,
    pub machining_cost: f64,
    pub setup_cost: f64,
    pub total_cost: f64,
    pub weight_grams: f64,
    pub volume_cm3: f64,
    pub surface_area_cm2: f64,
    pub quantity_price_breaks: Vec<PriceBreak>,
}

/// Relative machining effort per shape.
pub fn complexity_factor(shape: ShapeKind) -> f64 {
    match shape {
        ShapeKind::Box | ShapeKind::PlateWithHole => 1.0,
        ShapeKind::Gear | ShapeKind::Sphere | ShapeKind::Crankshaft | ShapeKind::Camshaft => 2.5,
        _ => 1.5,
    }
}

/// Estimate the cost of one part.
pub fn estimate_cost(
    shape: ShapeKind,
    dims: &DimensionSet,
    material: &Material,
    config: &CostConfig,
) -> CostEstimate {
    let volume_cm3 = volume_mm3(shape, dims) / 1000.0;
    let area_cm2 = surface_area_mm2(shape, dims) / 100.0;

    let weight_grams = volume_cm3 * material.density;
    let material_cost = weight_grams * material.price_per_gram;

    let machinability = material.machinability.max(0.01);
    let minutes = (area_cm2 * config.minutes_per_cm2 * complexity_factor(shape) / machinability)
        .max(config.min_machining_minutes);
    let machining_cost = minutes / 60.0 * config.hourly_rate;
    let total = config.setup_cost + material_cost + machining_cost;

    let quantity_price_breaks = config
        .price_breaks
        .iter()
        .map(|(quantity, multiplier)| {
            let unit_price = total * multiplier;
            PriceBreak {
                quantity: *quantity,
                unit_price,
                total_price: unit_price * *quantity as f64,
            }
        })
        .collect();

    debug!(
        "Cost for {} in {}: {:.2} cm³, {:.1} min, total {:.2}",
        shape, material.name, volume_cm3, minutes, total
    );

    CostEstimate {
        material: material.name.clone(),
        material_cost,
        machining_time_minutes: minutes,
        machining_cost,
        setup_cost: config.setup_cost,
        total_cost: total,
        weight_grams,
        volume_cm3,
        surface_area_cm2: area_cm2,
        quantity_price_breaks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MaterialTable;

    fn aluminum() -> Material {
        MaterialTable::default()
            .get("aluminum")
            .cloned()
            .expect("aluminum")
    }

    fn plate(l: f64, w: f64, h: f64) -> DimensionSet {
        DimensionSet {
            length: Some(l),
            width: Some(w),
            height: Some(h),
            ..Default::default()
        }
    }

    #[test]
    fn test_plate_estimate() {
        let estimate = estimate_cost(
            ShapeKind::Box,
            &plate(50.0, 50.0, 10.0),
            &aluminum(),
            &CostConfig::default(),
        );
        assert_eq!(estimate.volume_cm3, 25.0);
        assert!((estimate.weight_grams - 67.5).abs() < 1e-9);
        assert!((estimate.material_cost - 0.54).abs() < 1e-9);
        assert_eq!(estimate.surface_area_cm2, 70.0);
        // 70 cm² * 0.2 / 0.9
        assert!((estimate.machining_time_minutes - 140.0 / 9.0).abs() < 1e-9);
        assert_eq!(estimate.setup_cost, 50.0);
        assert!(estimate.total_cost > 50.0);
        assert_eq!(estimate.quantity_price_breaks.len(), 4);
        assert_eq!(estimate.quantity_price_breaks[0].unit_price, estimate.total_cost);
    }

    #[test]
    fn test_minimum_machining_time() {
        let estimate = estimate_cost(
            ShapeKind::Box,
            &plate(5.0, 5.0, 5.0),
            &aluminum(),
            &CostConfig::default(),
        );
        assert_eq!(estimate.machining_time_minutes, 5.0);
    }

    #[test]
    fn test_monotonic_in_each_dimension() {
        let material = aluminum();
        let config = CostConfig::default();
        let estimate = |d: &DimensionSet| estimate_cost(ShapeKind::Box, d, &material, &config);
        let reference = estimate(&plate(40.0, 30.0, 10.0));

        for (axis, step) in [(0, 40.0), (1, 30.0), (2, 10.0), (0, 0.01), (1, 0.01), (2, 0.01)] {
            let mut sides = [40.0, 30.0, 10.0];
            sides[axis] += step;
            let grown = estimate(&plate(sides[0], sides[1], sides[2]));
            assert!(
                grown.volume_cm3 > reference.volume_cm3,
                "volume did not grow for {:?}",
                sides
            );
            assert!(
                grown.material_cost > reference.material_cost,
                "material cost did not grow for {:?}",
                sides
            );
            assert!(grown.total_cost > reference.total_cost);
        }
    }

    #[test]
    fn test_sub_millimeter_growth_changes_material_cost() {
        let material = aluminum();
        let config = CostConfig::default();
        let a = estimate_cost(ShapeKind::Box, &plate(50.0, 50.0, 10.0), &material, &config);
        let b = estimate_cost(ShapeKind::Box, &plate(50.0, 50.0, 10.01), &material, &config);
        assert!(b.volume_cm3 > a.volume_cm3);
        assert!(b.material_cost > a.material_cost);
    }

    #[test]
    fn test_price_breaks_discount() {
        let estimate = estimate_cost(
            ShapeKind::Gear,
            &DimensionSet::default(),
            &aluminum(),
            &CostConfig::default(),
        );
        let breaks = &estimate.quantity_price_breaks;
        assert!(breaks.windows(2).all(|w| w[1].unit_price <= w[0].unit_price));
        assert_eq!(breaks[3].quantity, 1000);
    }

    #[test]
    fn test_complexity_factors() {
        assert_eq!(complexity_factor(ShapeKind::Box), 1.0);
        assert_eq!(complexity_factor(ShapeKind::Tube), 1.5);
        assert_eq!(complexity_factor(ShapeKind::Camshaft), 2.5);
    }
}
