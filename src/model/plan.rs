//! Geometry plan: ordered primitives and boolean operations.
//!
//! A plan is the hand-off between synthesis and whatever kernel builds the
//! solid. Operations reference primitives or earlier operations by name and the
//! plan names a single result solid.

use super::{FeatureOutcomes, ShapeKind};
use serde::{Deserialize, Serialize};

/// Rotation about an axis through the primitive's placement origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub axis: [f64; 3],
    pub degrees: f64,
}

/// Position and optional rotation of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub position: [f64; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
}

impl Placement {
    pub fn origin() -> Self {
        Self::default()
    }

    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: [x, y, z],
            rotation: None,
        }
    }

    pub fn rotated(mut self, axis: [f64; 3], degrees: f64) -> Self {
        self.rotation = Some(Rotation { axis, degrees });
        self
    }
}

/// Primitive solid kinds with their size parameters (mm).
///
/// Boxes grow from their placement corner along +X/+Y/+Z. Cylinders, cones and
/// prisms stand on their placement point along +Z. Spheres are centered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrimitiveKind {
    Box {
        length: f64,
        width: f64,
        height: f64,
    },
    Cylinder {
        radius: f64,
        height: f64,
    },
    Cone {
        radius1: f64,
        radius2: f64,
        height: f64,
    },
    Sphere {
        radius: f64,
    },
    /// Closed XY polygon extruded along +Z.
    Prism { points: Vec<[f64; 2]>, height: f64 },
}

/// A named primitive solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub name: String,
    #[serde(flatten)]
    pub kind: PrimitiveKind,
    pub placement: Placement,
}

/// Boolean or edge operation producing a new named solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Cut {
        name: String,
        base: String,
        tool: String,
    },
    Fuse {
        name: String,
        shapes: Vec<String>,
    },
    /// Round every edge of `source` longer than `min_edge_length`.
    Fillet {
        name: String,
        source: String,
        radius: f64,
        min_edge_length: f64,
    },
    /// Bevel every edge of `source` longer than `min_edge_length`.
    Chamfer {
        name: String,
        source: String,
        size: f64,
        min_edge_length: f64,
    },
}

impl Operation {
    pub fn name(&self) -> &str {
        match self {
            Operation::Cut { name, .. }
            | Operation::Fuse { name, .. }
            | Operation::Fillet { name, .. }
            | Operation::Chamfer { name, .. } => name,
        }
    }

    /// Names this operation consumes.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Operation::Cut { base, tool, .. } => vec![base, tool],
            Operation::Fuse { shapes, .. } => shapes.iter().map(String::as_str).collect(),
            Operation::Fillet { source, .. } | Operation::Chamfer { source, .. } => vec![source],
        }
    }
}

/// Complete synthesis output for one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryPlan {
    pub shape: ShapeKind,
    pub primitives: Vec<Primitive>,
    pub operations: Vec<Operation>,
    /// Name of the final solid.
    pub result: String,
    /// Manufacturing notes such as fit callouts and thread specs.
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub features: FeatureOutcomes,
}

impl GeometryPlan {
    pub fn new(shape: ShapeKind) -> Self {
        Self {
            shape,
            primitives: Vec::new(),
            operations: Vec::new(),
            result: String::new(),
            notes: Vec::new(),
            warnings: Vec::new(),
            features: FeatureOutcomes::default(),
        }
    }

    /// Whether a primitive or operation already uses `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.primitives.iter().any(|p| p.name == name)
            || self.operations.iter().any(|o| o.name() == name)
    }

    /// `base` if unused, otherwise `base` with the first free numeric suffix.
    pub fn unique_name(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}{}", base, n))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Declare a primitive and return its name.
    pub fn add_primitive(&mut self, name: &str, kind: PrimitiveKind, placement: Placement) -> String {
        let name = self.unique_name(name);
        self.primitives.push(Primitive {
            name: name.clone(),
            kind,
            placement,
        });
        name
    }

    /// Append a cut and return the new solid's name.
    pub fn cut(&mut self, name: &str, base: &str, tool: &str) -> String {
        let name = self.unique_name(name);
        self.operations.push(Operation::Cut {
            name: name.clone(),
            base: base.to_string(),
            tool: tool.to_string(),
        });
        name
    }

    /// Append a fuse and return the new solid's name.
    pub fn fuse(&mut self, name: &str, shapes: Vec<String>) -> String {
        let name = self.unique_name(name);
        self.operations.push(Operation::Fuse {
            name: name.clone(),
            shapes,
        });
        name
    }

    pub fn fillet(&mut self, source: &str, radius: f64, min_edge_length: f64) -> String {
        let name = self.unique_name("Filleted");
        self.operations.push(Operation::Fillet {
            name: name.clone(),
            source: source.to_string(),
            radius,
            min_edge_length,
        });
        name
    }

    pub fn chamfer(&mut self, source: &str, size: f64, min_edge_length: f64) -> String {
        let name = self.unique_name("Chamfered");
        self.operations.push(Operation::Chamfer {
            name: name.clone(),
            source: source.to_string(),
            size,
            min_edge_length,
        });
        name
    }

    pub fn set_result(&mut self, name: impl Into<String>) {
        self.result = name.into();
    }

    pub fn primitive(&self, name: &str) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.name == name)
    }

    /// Check that every operation only references names declared before it and
    /// that the result names an existing solid.
    pub fn is_well_formed(&self) -> bool {
        let mut known: Vec<&str> = self.primitives.iter().map(|p| p.name.as_str()).collect();
        for op in &self.operations {
            if op.inputs().iter().any(|input| !known.contains(input)) {
                return false;
            }
            known.push(op.name());
        }
        known.contains(&self.result.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_names() {
        let mut plan = GeometryPlan::new(ShapeKind::Box);
        let a = plan.add_primitive("Hole", PrimitiveKind::Sphere { radius: 1.0 }, Placement::origin());
        let b = plan.add_primitive("Hole", PrimitiveKind::Sphere { radius: 1.0 }, Placement::origin());
        let c = plan.add_primitive("Hole", PrimitiveKind::Sphere { radius: 1.0 }, Placement::origin());
        assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("Hole", "Hole2", "Hole3"));
    }

    #[test]
    fn test_well_formed() {
        let mut plan = GeometryPlan::new(ShapeKind::Tube);
        let outer = plan.add_primitive(
            "Outer",
            PrimitiveKind::Cylinder {
                radius: 10.0,
                height: 5.0,
            },
            Placement::origin(),
        );
        let inner = plan.add_primitive(
            "Inner",
            PrimitiveKind::Cylinder {
                radius: 5.0,
                height: 7.0,
            },
            Placement::at(0.0, 0.0, -1.0),
        );
        let result = plan.cut("Tube", &outer, &inner);
        plan.set_result(&result);
        assert!(plan.is_well_formed());

        plan.operations.insert(
            0,
            Operation::Fuse {
                name: "Early".to_string(),
                shapes: vec!["Tube".to_string()],
            },
        );
        assert!(!plan.is_well_formed());
    }

    #[test]
    fn test_primitive_serialization_is_flat() {
        let prim = Primitive {
            name: "Base".to_string(),
            kind: PrimitiveKind::Cylinder {
                radius: 2.0,
                height: 3.0,
            },
            placement: Placement::origin(),
        };
        let value = serde_json::to_value(&prim).expect("serializes");
        assert_eq!(value["kind"], "cylinder");
        assert_eq!(value["radius"], 2.0);
    }
}
