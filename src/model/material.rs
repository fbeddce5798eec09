//! Material catalogue used by DFM and costing.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Broad material family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialFamily {
    Metal,
    Plastic,
}

/// Physical and commercial properties of one stock material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Canonical identifier, e.g. `aluminum_6061`.
    pub name: String,
    pub family: MaterialFamily,
    /// Density (g/cm³).
    pub density: f64,
    /// Stock price per gram.
    pub price_per_gram: f64,
    /// Relative ease of machining, 0 (hard) to 1 (free cutting).
    pub machinability: f64,
}

impl Material {
    fn new(
        name: &str,
        family: MaterialFamily,
        density: f64,
        price_per_gram: f64,
        machinability: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            family,
            density,
            price_per_gram,
            machinability,
        }
    }

    pub fn is_plastic(&self) -> bool {
        self.family == MaterialFamily::Plastic
    }
}

/// Materials keyed by canonical name, plus alias spellings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTable {
    pub materials: BTreeMap<String, Material>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl Default for MaterialTable {
    fn default() -> Self {
        let materials = [
            Material::new("aluminum_6061", MaterialFamily::Metal, 2.70, 0.008, 0.9),
            Material::new("steel_1018", MaterialFamily::Metal, 7.87, 0.003, 0.7),
            Material::new("stainless_304", MaterialFamily::Metal, 8.00, 0.006, 0.45),
            Material::new("titanium_ti6al4v", MaterialFamily::Metal, 4.43, 0.035, 0.25),
            Material::new("brass_360", MaterialFamily::Metal, 8.50, 0.009, 1.0),
            Material::new("abs", MaterialFamily::Plastic, 1.05, 0.004, 0.95),
            Material::new("pla", MaterialFamily::Plastic, 1.24, 0.003, 0.95),
        ];
        let aliases = [
            ("aluminum", "aluminum_6061"),
            ("aluminium", "aluminum_6061"),
            ("al", "aluminum_6061"),
            ("6061", "aluminum_6061"),
            ("steel", "steel_1018"),
            ("mild_steel", "steel_1018"),
            ("1018", "steel_1018"),
            ("stainless", "stainless_304"),
            ("stainless_steel", "stainless_304"),
            ("ss304", "stainless_304"),
            ("titanium", "titanium_ti6al4v"),
            ("ti", "titanium_ti6al4v"),
            ("brass", "brass_360"),
            ("abs_plastic", "abs"),
            ("pla_plastic", "pla"),
        ];
        Self {
            materials: materials.into_iter().map(|m| (m.name.clone(), m)).collect(),
            aliases: aliases
                .into_iter()
                .map(|(a, n)| (a.to_string(), n.to_string()))
                .collect(),
        }
    }
}

impl MaterialTable {
    /// Normalize a user-supplied material name ("Stainless Steel" → "stainless_steel").
    fn normalize(name: &str) -> String {
        name.trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }

    /// Look up a material by canonical name or alias.
    pub fn get(&self, name: &str) -> Result<&Material> {
        let key = Self::normalize(name);
        let canonical = self.aliases.get(&key).unwrap_or(&key);
        self.materials
            .get(canonical)
            .ok_or_else(|| PipelineError::UnknownMaterial {
                name: name.to_string(),
            })
    }

    /// Replace prices for known materials. Unknown names are ignored.
    pub fn with_prices<'a>(&self, prices: impl IntoIterator<Item = (&'a String, &'a f64)>) -> Self {
        let mut table = self.clone();
        for (name, price) in prices {
            if let Some(material) = table.materials.get_mut(name) {
                if price.is_finite() && *price > 0.0 {
                    material.price_per_gram = *price;
                }
            }
        }
        table
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_aliases() {
        let table = MaterialTable::default();
        assert_eq!(table.get("Aluminium").map(|m| m.name.as_str()).ok(), Some("aluminum_6061"));
        assert_eq!(
            table.get("Stainless Steel").map(|m| m.name.as_str()).ok(),
            Some("stainless_304")
        );
        assert_eq!(table.get("pla").map(|m| m.family).ok(), Some(MaterialFamily::Plastic));
    }

    #[test]
    fn test_unknown_material() {
        let table = MaterialTable::default();
        let err = table.get("unobtainium").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownMaterial { .. }));
    }

    #[test]
    fn test_with_prices() {
        let table = MaterialTable::default();
        let prices: std::collections::HashMap<String, f64> = [
            ("steel_1018".to_string(), 0.005),
            ("unobtainium".to_string(), 1.0),
            ("abs".to_string(), -1.0),
        ]
        .into_iter()
        .collect();
        let updated = table.with_prices(&prices);
        assert_eq!(updated.get("steel").map(|m| m.price_per_gram).ok(), Some(0.005));
        assert_eq!(updated.get("abs").map(|m| m.price_per_gram).ok(), Some(0.004));
        assert_eq!(table.get("steel").map(|m| m.price_per_gram).ok(), Some(0.003));
    }
}
