//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::commerce::{Consumer, Supplier, Tender};
use crate::fixed::Fixed64;
use crate::graph::{ProcessGraph, Route, Workplace};
use crate::id::WorkplaceId;
use crate::improvement::LeanImprovement;
use crate::metrics::{MetricsDeriver, SimulationResults};
use crate::params::{SimulationParameters, WarehouseKind};
use crate::resource::{Equipment, Logist, Worker};
use crate::sim::Step;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Entity constructors
// ===========================================================================

pub fn worker(id: &str, specialty: &str) -> Worker {
    Worker {
        specialty: specialty.to_string(),
        qualification: 3,
        salary: 4_000,
        ..Worker::new(id, format!("Worker {id}"))
    }
}

pub fn equipment(id: &str) -> Equipment {
    Equipment {
        reliability: fixed(0.9),
        maintenance_cost: 1_500,
        purchase_cost: 120_000,
        ..Equipment::new(id, format!("Equipment {id}"))
    }
}

pub fn supplier(id: &str) -> Supplier {
    Supplier {
        material_type: "steel".to_string(),
        reliability: fixed(0.95),
        product_quality: fixed(0.9),
        cost: 20_000,
        delivery_cost: 2_000,
        ..Supplier::new(id, format!("Supplier {id}"))
    }
}

pub fn logist() -> Logist {
    Logist {
        vehicle_type: "truck".to_string(),
        vehicle_capacity: 500,
        salary: 3_500,
        ..Logist::new("l-1", "Logist")
    }
}

pub fn tender(id: &str, quantity: u64) -> Tender {
    Tender::new(id, Consumer::new("c-city", "City Council"), 400_000, quantity)
}

pub fn wp(id: &str) -> WorkplaceId {
    WorkplaceId::new(id)
}

/// Cut, weld, paint: three workplaces in a line, unstaffed.
pub fn assembly_line() -> ProcessGraph {
    let mut graph = ProcessGraph::with_contents(
        "line",
        vec![
            Workplace::new("wp-cut", "Cutting"),
            Workplace::new("wp-weld", "Welding"),
            Workplace::new("wp-paint", "Painting"),
        ],
        vec![
            Route::new("wp-cut", "wp-weld"),
            Route::new("wp-weld", "wp-paint"),
        ],
    );
    graph.set_workplace_as_start_node(&wp("wp-cut"));
    graph.set_workplace_as_end_node(&wp("wp-paint"));
    graph
}

/// Lean improvement catalog with one entry already implemented, as a store
/// might hand it back.
pub fn improvement_catalog() -> Vec<LeanImprovement> {
    let mut five_s = LeanImprovement::new("5s", "5S");
    five_s.is_implemented = true;
    five_s.implementation_cost = 50_000;
    five_s.efficiency_gain = fixed(0.05);
    let mut kanban = LeanImprovement::new("kanban", "Kanban");
    kanban.implementation_cost = 80_000;
    kanban.efficiency_gain = fixed(0.1);
    vec![five_s, kanban]
}

/// A partly staffed plant with one supplier, a logist, one tender, and some
/// steel in stock.
pub fn staffed_parameters() -> SimulationParameters {
    let mut p = SimulationParameters::new(10_000_000);
    *p.process_graph_mut() = assembly_line();
    p.set_worker_on_workplace(&wp("wp-cut"), worker("w-1", "cutter"));
    p.set_worker_on_workplace(&wp("wp-weld"), worker("w-2", "welder"));
    p.set_equipment_on_workplace(&wp("wp-weld"), equipment("eq-1"));
    p.set_logist(Some(logist()));
    p.add_supplier(supplier("s-1")).unwrap();
    p.add_tender(tender("t-1", 100)).unwrap();
    p.add_material(WarehouseKind::Materials, "steel", 200).unwrap();
    p
}

// ===========================================================================
// Derivers
// ===========================================================================

/// Deriver returning empty results for the requested step.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubDeriver;

impl MetricsDeriver for StubDeriver {
    fn derive(&mut self, _parameters: &SimulationParameters, step: Step) -> SimulationResults {
        SimulationResults::empty(step)
    }
}

pub fn stub_deriver() -> StubDeriver {
    StubDeriver
}
