//! Staff and equipment assigned to workplaces and warehouses.
//!
//! These values are held by the graph or warehouse they are assigned to, but
//! their lifecycle is external: they are hired or bought elsewhere and copied
//! in on assignment. Equality is by identity key only.

use crate::fixed::Fixed64;
use crate::id::{EquipmentId, LogistId, WorkerId, identity_keyed};
use serde::{Deserialize, Serialize};

/// A worker that can staff a workplace or run a warehouse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub worker_id: WorkerId,
    pub name: String,
    pub specialty: String,
    pub qualification: u32,
    /// Salary per step.
    pub salary: i64,
}

identity_keyed!(Worker, worker_id);

impl Worker {
    pub fn new(worker_id: impl Into<WorkerId>, name: impl Into<String>) -> Self {
        Self {
            worker_id: worker_id.into(),
            name: name.into(),
            specialty: String::new(),
            qualification: 0,
            salary: 0,
        }
    }

    /// Whether this worker meets a workplace's staffing requirements.
    pub fn is_qualified_for(&self, specialty: &str, qualification: u32) -> bool {
        (specialty.is_empty() || self.specialty == specialty) && self.qualification >= qualification
    }
}

/// A machine installed on a workplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub equipment_id: EquipmentId,
    pub name: String,
    /// Probability of running a step without breakdown, in [0, 1].
    pub reliability: Fixed64,
    pub maintenance_period_days: u32,
    pub maintenance_cost: i64,
    pub purchase_cost: i64,
    pub repair_cost: i64,
    pub repair_time_days: u32,
}

identity_keyed!(Equipment, equipment_id);

impl Equipment {
    pub fn new(equipment_id: impl Into<EquipmentId>, name: impl Into<String>) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            name: name.into(),
            reliability: Fixed64::ONE,
            maintenance_period_days: 30,
            maintenance_cost: 0,
            purchase_cost: 0,
            repair_cost: 0,
            repair_time_days: 0,
        }
    }
}

/// The logistics operator moving materials between suppliers and the plant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logist {
    pub logist_id: LogistId,
    pub name: String,
    pub vehicle_type: String,
    /// Payload per delivery.
    pub vehicle_capacity: u32,
    pub salary: i64,
}

identity_keyed!(Logist, logist_id);

impl Logist {
    pub fn new(logist_id: impl Into<LogistId>, name: impl Into<String>) -> Self {
        Self {
            logist_id: logist_id.into(),
            name: name.into(),
            vehicle_type: String::new(),
            vehicle_capacity: 0,
            salary: 0,
        }
    }
}
