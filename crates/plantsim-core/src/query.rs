//! Read-only lookups over a simulation's history, keyed by step number.
//!
//! Bundle and snapshot lookups return `None` for unknown steps. The
//! warehouse series returns an empty series instead.

use crate::graph::ProcessGraph;
use crate::metrics::{
    CommercialMetrics, EngineeringMetrics, FactoryMetrics, ProcurementMetrics,
    ProductionMetrics, QualityMetrics, SimulationResults,
};
use crate::schedule::ProductionSchedule;
use crate::sim::{FIRST_STEP, Step};
use crate::simulation::Simulation;
use serde::{Deserialize, Serialize};

/// Load and capacity of both warehouses at one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehousePoint {
    pub step: Step,
    pub materials_load: u64,
    pub materials_capacity: u64,
    pub products_load: u64,
    pub products_capacity: u64,
}

/// Warehouse load/capacity history, oldest step first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseSeries {
    pub points: Vec<WarehousePoint>,
}

impl WarehouseSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

impl Simulation {
    pub fn result_for_step(&self, step: Step) -> Option<&SimulationResults> {
        self.results().iter().find(|r| r.step == step)
    }

    pub fn factory_metrics(&self, step: Step) -> Option<&FactoryMetrics> {
        self.result_for_step(step)?.factory.as_ref()
    }

    pub fn production_metrics(&self, step: Step) -> Option<&ProductionMetrics> {
        self.result_for_step(step)?.production.as_ref()
    }

    pub fn quality_metrics(&self, step: Step) -> Option<&QualityMetrics> {
        self.result_for_step(step)?.quality.as_ref()
    }

    pub fn engineering_metrics(&self, step: Step) -> Option<&EngineeringMetrics> {
        self.result_for_step(step)?.engineering.as_ref()
    }

    pub fn commercial_metrics(&self, step: Step) -> Option<&CommercialMetrics> {
        self.result_for_step(step)?.commercial.as_ref()
    }

    pub fn procurement_metrics(&self, step: Step) -> Option<&ProcurementMetrics> {
        self.result_for_step(step)?.procurement.as_ref()
    }

    /// The process graph as configured at `step`.
    pub fn process_graph_at(&self, step: Step) -> Option<&ProcessGraph> {
        self.parameters_for_step(step).map(|p| p.process_graph())
    }

    /// The production schedule as configured at `step`.
    pub fn production_schedule_at(&self, step: Step) -> Option<&ProductionSchedule> {
        self.parameters_for_step(step).map(|p| p.production_schedule())
    }

    /// Warehouse load and capacity for every recorded step up to `step`.
    /// Returns an empty series if no parameters exist for `step`.
    pub fn warehouse_series(&self, step: Step) -> WarehouseSeries {
        if self.parameters_for_step(step).is_none() {
            return WarehouseSeries::default();
        }
        let mut points: Vec<WarehousePoint> = self
            .parameters()
            .iter()
            .filter(|p| (FIRST_STEP..=step).contains(&p.step))
            .map(|p| WarehousePoint {
                step: p.step,
                materials_load: p.materials_warehouse.load(),
                materials_capacity: p.materials_warehouse.capacity,
                products_load: p.products_warehouse.load(),
                products_capacity: p.products_warehouse.capacity,
            })
            .collect();
        points.sort_by_key(|p| p.step);
        WarehouseSeries { points }
    }
}
