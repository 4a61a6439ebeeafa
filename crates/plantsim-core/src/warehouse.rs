use crate::error::{SimError, SimResult, non_negative};
use crate::resource::Worker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A capacity-bounded ledger of material quantities keyed by material name.
///
/// The validated operations never leave `load() > capacity`. The fields are
/// public, so a direct assignment can still produce an over-full warehouse;
/// `add_material` then rejects every addition until the load drops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub capacity: u64,
    /// Quantities by material name. Entries drained to zero are kept.
    pub contents: BTreeMap<String, u64>,
    pub inventory_worker: Option<Worker>,
}

impl Warehouse {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            contents: BTreeMap::new(),
            inventory_worker: None,
        }
    }

    /// Total quantity across all materials.
    pub fn load(&self) -> u64 {
        self.contents
            .values()
            .fold(0u64, |acc, &q| acc.saturating_add(q))
    }

    pub fn is_full(&self) -> bool {
        self.load() >= self.capacity
    }

    /// Remaining room before the warehouse is full.
    pub fn free_space(&self) -> u64 {
        self.capacity.saturating_sub(self.load())
    }

    /// Quantity held of a material; zero when absent.
    pub fn quantity(&self, material: &str) -> u64 {
        self.contents.get(material).copied().unwrap_or(0)
    }

    /// Add `quantity` of `material`. The check is against the total load,
    /// not the per-material amount. Nothing changes on failure.
    pub fn add_material(&mut self, material: &str, quantity: i64) -> SimResult<()> {
        let quantity = non_negative(quantity, "quantity")?;
        let load = self.load();
        if load
            .checked_add(quantity)
            .is_none_or(|total| total > self.capacity)
        {
            return Err(SimError::CapacityExceeded {
                requested: quantity,
                load,
                capacity: self.capacity,
            });
        }
        *self.contents.entry(material.to_string()).or_insert(0) += quantity;
        Ok(())
    }

    /// Remove `quantity` of `material`. Removing zero of a present material
    /// is a no-op.
    pub fn remove_material(&mut self, material: &str, quantity: i64) -> SimResult<()> {
        let quantity = non_negative(quantity, "quantity")?;
        let available = self
            .contents
            .get_mut(material)
            .ok_or_else(|| SimError::not_found("material", material))?;
        if *available < quantity {
            return Err(SimError::InsufficientStock {
                material: material.to_string(),
                requested: quantity,
                available: *available,
            });
        }
        *available -= quantity;
        Ok(())
    }

    pub fn increase_size(&mut self, amount: u64) {
        self.capacity = self.capacity.saturating_add(amount);
    }

    /// Shrink capacity, clamping at zero. Existing contents are untouched,
    /// which may leave the warehouse over-full.
    pub fn decrease_size(&mut self, amount: u64) {
        self.capacity = self.capacity.saturating_sub(amount);
    }

    pub fn set_inventory_worker(&mut self, worker: Option<Worker>) {
        self.inventory_worker = worker;
    }
}

impl Default for Warehouse {
    fn default() -> Self {
        Self::new(0)
    }
}
