//! Shape categories a prompt can resolve to.

use serde::{Deserialize, Serialize};

/// Primary shape of a requested part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Box,
    Cylinder,
    Sphere,
    Cone,
    Tube,
    Gear,
    Piston,
    Flange,
    Bolt,
    Washer,
    PlateWithHole,
    Crankshaft,
    Camshaft,
}

impl ShapeKind {
    /// Every shape, in declaration order.
    pub const ALL: [ShapeKind; 13] = [
        ShapeKind::Box,
        ShapeKind::Cylinder,
        ShapeKind::Sphere,
        ShapeKind::Cone,
        ShapeKind::Tube,
        ShapeKind::Gear,
        ShapeKind::Piston,
        ShapeKind::Flange,
        ShapeKind::Bolt,
        ShapeKind::Washer,
        ShapeKind::PlateWithHole,
        ShapeKind::Crankshaft,
        ShapeKind::Camshaft,
    ];

    /// Snake-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Cone => "cone",
            ShapeKind::Tube => "tube",
            ShapeKind::Gear => "gear",
            ShapeKind::Piston => "piston",
            ShapeKind::Flange => "flange",
            ShapeKind::Bolt => "bolt",
            ShapeKind::Washer => "washer",
            ShapeKind::PlateWithHole => "plate_with_hole",
            ShapeKind::Crankshaft => "crankshaft",
            ShapeKind::Camshaft => "camshaft",
        }
    }

    /// Prismatic shapes with a length/width/height footprint.
    pub fn is_plate_like(&self) -> bool {
        matches!(self, ShapeKind::Box | ShapeKind::PlateWithHole)
    }

    /// Round shapes whose size is a radius and a height.
    pub fn is_cylinder_family(&self) -> bool {
        matches!(
            self,
            ShapeKind::Cylinder
                | ShapeKind::Piston
                | ShapeKind::Flange
                | ShapeKind::Tube
                | ShapeKind::Washer
                | ShapeKind::Bolt
        )
    }

    /// Shapes produced by turning about a single axis.
    pub fn is_rotational(&self) -> bool {
        self.is_cylinder_family()
            || matches!(
                self,
                ShapeKind::Sphere | ShapeKind::Cone | ShapeKind::Crankshaft | ShapeKind::Camshaft
            )
    }

    /// Shapes sized by radius/diameter rather than length/width.
    pub fn is_round(&self) -> bool {
        self.is_cylinder_family()
            || matches!(self, ShapeKind::Sphere | ShapeKind::Cone | ShapeKind::Gear)
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ShapeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("unknown shape '{}'", s))
    }
}
