use crate::commerce::{DealingWithDefects, DistributionStrategy, SalesStrategy};
use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};

/// Engine configuration used when seeding the first step of a simulation.
///
/// Every field has a default, so partial configuration files are valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Capital the plant starts with.
    pub initial_capital: i64,
    pub materials_warehouse_capacity: u64,
    pub products_warehouse_capacity: u64,
    /// Seed for the default metrics deriver.
    pub rng_seed: u64,
    pub default_sales_strategy: SalesStrategy,
    pub default_dealing_with_defects: DealingWithDefects,
    pub default_distribution_strategy: DistributionStrategy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000_000,
            materials_warehouse_capacity: 1000,
            products_warehouse_capacity: 1000,
            rng_seed: 0x5EED,
            default_sales_strategy: SalesStrategy::default(),
            default_dealing_with_defects: DealingWithDefects::default(),
            default_distribution_strategy: DistributionStrategy::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.initial_capital < 0 {
            return Err(SimError::InvalidArgument(format!(
                "initial_capital must be >= 0, got {}",
                self.initial_capital
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.initial_capital, 10_000_000);
        assert_eq!(config.materials_warehouse_capacity, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"initial_capital": 500, "default_sales_strategy": "ADVERTISING"}"#)
                .unwrap();
        assert_eq!(config.initial_capital, 500);
        assert_eq!(config.default_sales_strategy, SalesStrategy::Advertising);
        assert_eq!(config.products_warehouse_capacity, 1000);
    }

    #[test]
    fn negative_capital_rejected() {
        let config = SimulationConfig {
            initial_capital: -1,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
