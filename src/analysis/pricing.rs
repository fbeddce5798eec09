//! Pluggable material price data.

use crate::error::Result;
use crate::model::MaterialTable;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Source of current material prices, keyed by canonical material name.
pub trait PriceSource {
    fn get_prices(&self) -> Result<HashMap<String, f64>>;
}

/// Prices taken from a fixed table.
#[derive(Debug, Clone)]
pub struct StaticPrices {
    table: MaterialTable,
}

impl StaticPrices {
    pub fn new(table: MaterialTable) -> Self {
        Self { table }
    }
}

impl PriceSource for StaticPrices {
    fn get_prices(&self) -> Result<HashMap<String, f64>> {
        Ok(self
            .table
            .materials
            .values()
            .map(|m| (m.name.clone(), m.price_per_gram))
            .collect())
    }
}

/// Material table shared between requests and refreshed in place.
///
/// Readers take a snapshot `Arc`; a refresh swaps the whole table, so a request
/// never sees a half-updated price list.
#[derive(Debug)]
pub struct SharedMaterials {
    fallback: MaterialTable,
    current: RwLock<Arc<MaterialTable>>,
}

impl SharedMaterials {
    pub fn new(table: MaterialTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table.clone())),
            fallback: table,
        }
    }

    /// Current table.
    pub fn snapshot(&self) -> Arc<MaterialTable> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Pull prices from `source`. On failure the static table is restored and
    /// `false` is returned.
    pub fn refresh(&self, source: &dyn PriceSource) -> bool {
        let (table, ok) = match source.get_prices() {
            Ok(prices) => {
                info!("Refreshed {} material price(s)", prices.len());
                (self.fallback.with_prices(&prices), true)
            }
            Err(e) => {
                warn!("Price refresh failed, using static prices: {}", e);
                (self.fallback.clone(), false)
            }
        };
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(table);
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    struct Fixed(Vec<(&'static str, f64)>);

    impl PriceSource for Fixed {
        fn get_prices(&self) -> Result<HashMap<String, f64>> {
            Ok(self.0.iter().map(|(n, p)| (n.to_string(), *p)).collect())
        }
    }

    struct Broken;

    impl PriceSource for Broken {
        fn get_prices(&self) -> Result<HashMap<String, f64>> {
            Err(PipelineError::Config {
                message: "feed offline".to_string(),
            })
        }
    }

    fn steel_price(shared: &SharedMaterials) -> f64 {
        shared
            .snapshot()
            .get("steel")
            .map(|m| m.price_per_gram)
            .expect("steel")
    }

    #[test]
    fn test_static_prices_round_trip() {
        let table = MaterialTable::default();
        let prices = StaticPrices::new(table.clone()).get_prices().expect("prices");
        assert_eq!(prices.get("steel_1018"), Some(&0.003));
        assert_eq!(prices.len(), table.materials.len());
    }

    #[test]
    fn test_refresh_swaps_table() {
        let shared = SharedMaterials::new(MaterialTable::default());
        let before = shared.snapshot();
        assert!(shared.refresh(&Fixed(vec![("steel_1018", 0.01)])));
        assert_eq!(steel_price(&shared), 0.01);
        assert_eq!(before.get("steel").map(|m| m.price_per_gram).ok(), Some(0.003));
    }

    #[test]
    fn test_failed_refresh_falls_back() {
        let shared = SharedMaterials::new(MaterialTable::default());
        shared.refresh(&Fixed(vec![("steel_1018", 0.01)]));
        assert!(!shared.refresh(&Broken));
        assert_eq!(steel_price(&shared), 0.003);
    }
}
