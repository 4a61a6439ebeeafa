//! Cross-crate training session tests.
//!
//! A session is seeded from configuration and catalog files on disk, played
//! through all four steps, then exported as records and a binary snapshot.

use std::path::{Path, PathBuf};

use plantsim_core::catalog::seed_simulation;
use plantsim_core::commerce::{DealingWithDefects, SalesStrategy};
use plantsim_core::error::ErrorKind;
use plantsim_core::fixed::Fixed64;
use plantsim_core::graph::Route;
use plantsim_core::id::{ImprovementId, SupplierId};
use plantsim_core::metrics::HeuristicDeriver;
use plantsim_core::params::WarehouseKind;
use plantsim_core::record::{FieldValue, Record, ToRecord};
use plantsim_core::sim::MAX_STEPS;
use plantsim_core::test_utils::*;
use plantsim_core::Simulation;
use plantsim_data::{FileCatalog, find_config, logging};

// ===========================================================================
// Data directory
// ===========================================================================

struct DataDir(PathBuf);

impl DataDir {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!(
            "plantsim_session_{}_{name}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn path(&self) -> &Path {
        &self.0
    }

    fn write(&self, file: &str, contents: &str) {
        std::fs::write(self.0.join(file), contents).unwrap();
    }
}

impl Drop for DataDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// A small plant: config, two lean improvements, one production option,
/// and a three-station line.
fn plant_data(name: &str) -> DataDir {
    let dir = DataDir::new(name);
    dir.write(
        "plantsim.toml",
        r#"
initial_capital = 5000000
materials_warehouse_capacity = 800
rng_seed = 11
default_dealing_with_defects = "SELL_AT_DISCOUNT"
"#,
    );
    dir.write(
        "lean_improvements.json",
        r#"[
            {"id": "5s", "name": "5S", "cost": 40000, "efficiency_gain": 0.05},
            {"id": "kanban", "name": "Kanban", "cost": 90000, "efficiency_gain": 0.1}
        ]"#,
    );
    dir.write(
        "production_improvements.ron",
        r#"[(id: "robot-arm", name: Some("Robot arm"), cost: 250000, efficiency_gain: 0.2)]"#,
    );
    dir.write(
        "workplaces.toml",
        r#"
[[workplaces]]
id = "wp-cut"
name = "Cutting"
speciality = "cutter"

[[workplaces]]
id = "wp-weld"
name = "Welding"
speciality = "welder"

[[workplaces]]
id = "wp-paint"
name = "Painting"
"#,
    );
    dir
}

async fn seeded(dir: &DataDir) -> Simulation {
    let config = find_config(dir.path()).unwrap();
    let catalog = FileCatalog::new(dir.path());
    seed_simulation("room-42", &config, &catalog, &catalog)
        .await
        .unwrap()
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn seeded_session_reflects_files() {
    logging::init_test();
    let dir = plant_data("seed");
    let sim = seeded(&dir).await;

    assert_eq!(sim.room_id, "room-42");
    assert_eq!(sim.capital(), 5_000_000);
    let p = sim.current_parameters().unwrap();
    assert_eq!(p.step, 1);
    assert_eq!(p.materials_warehouse.capacity, 800);
    assert_eq!(p.products_warehouse.capacity, 1000);
    assert_eq!(p.dealing_with_defects, DealingWithDefects::SellAtDiscount);
    assert_eq!(p.lean_improvements().len(), 2);
    assert_eq!(p.production_improvements().len(), 1);
    assert_eq!(p.process_graph().workplace_count(), 3);
    assert_eq!(p.process_graph().route_count(), 0);
}

#[tokio::test]
async fn full_session_from_files() {
    logging::init_test();
    let dir = plant_data("full");
    let config = find_config(dir.path()).unwrap();
    let mut sim = seeded(&dir).await;
    let mut deriver = HeuristicDeriver::new(config.rng_seed);

    // Step 1: wire the line and staff it.
    {
        let p = sim.current_parameters_mut().unwrap();
        let graph = p.process_graph_mut();
        graph.add_route(Route::new("wp-cut", "wp-weld"));
        graph.add_route(Route::new("wp-weld", "wp-paint"));
        graph.set_workplace_as_start_node(&wp("wp-cut"));
        graph.set_workplace_as_end_node(&wp("wp-paint"));
        p.set_worker_on_workplace(&wp("wp-cut"), worker("w-1", "cutter"));
        p.set_worker_on_workplace(&wp("wp-weld"), worker("w-2", "welder"));
        p.set_equipment_on_workplace(&wp("wp-weld"), equipment("eq-1"));
        p.add_supplier(supplier("s-1")).unwrap();
        p.add_tender(tender("t-1", 120)).unwrap();
        p.add_material(WarehouseKind::Materials, "steel", 300).unwrap();
    }
    sim.advance_step(&mut deriver).unwrap();

    // Step 2: adopt 5S and the robot arm.
    {
        let p = sim.current_parameters_mut().unwrap();
        p.set_lean_improvement_implemented(&ImprovementId::new("5s"), true)
            .unwrap();
        p.add_product_improvement("Robot arm").unwrap();
    }
    sim.advance_step(&mut deriver).unwrap();

    // Step 3: quality push.
    {
        let p = sim.current_parameters_mut().unwrap();
        p.set_sales_strategy("HIGH_QUALITY").unwrap();
        p.set_quality_inspection(&SupplierId::new("s-1"), true).unwrap();
        p.increase_product_warehouse_size(200).unwrap();
    }
    sim.advance_step(&mut deriver).unwrap();
    let last = sim.advance_step(&mut deriver).unwrap();

    assert_eq!(last.result_step, MAX_STEPS);
    assert!(sim.is_completed());
    assert_eq!(sim.parameters().len(), 4);
    assert_eq!(sim.results().len(), 4);
    assert_eq!(sim.capital(), 5_000_000 - 20_000);
    assert_eq!(
        sim.advance_step(&mut deriver).unwrap_err().kind(),
        ErrorKind::StepLimitReached
    );

    // Per-step history.
    assert!(!sim.parameters_for_step(1).unwrap().lean_improvements()[0].is_implemented);
    assert!(sim.parameters_for_step(2).unwrap().lean_improvements()[0].is_implemented);
    assert_eq!(
        sim.commercial_metrics(3).unwrap().sales_strategy,
        SalesStrategy::HighQuality
    );
    for result in sim.results() {
        assert!(result.has_all_bundles());
        let q = sim.quality_metrics(result.step).unwrap();
        assert!(q.defect_rate >= Fixed64::ZERO && q.defect_rate <= Fixed64::ONE);
    }

    let series = sim.warehouse_series(4);
    assert_eq!(series.len(), 4);
    assert_eq!(series.points[0].products_capacity, 1000);
    assert_eq!(series.points[3].products_capacity, 1200);
    assert_eq!(series.points[0].materials_load, 300);

    // Export: record and snapshot.
    let json = sim.to_record().to_json_string().unwrap();
    let record = Record::from_json_str(&json).unwrap();
    assert_eq!(record.type_name(), Some("Simulation"));
    assert_eq!(
        record.get("room_id").and_then(FieldValue::as_text),
        Some("room-42")
    );

    let bytes = sim.save_snapshot().unwrap();
    let restored = Simulation::restore_snapshot(&bytes).unwrap();
    assert_eq!(restored, sim);
}

#[tokio::test]
async fn same_files_same_seed_same_results() {
    let dir = plant_data("determinism");
    let run = |mut sim: Simulation| {
        let mut deriver = HeuristicDeriver::new(11);
        while !sim.is_completed() {
            sim.advance_step(&mut deriver).unwrap();
        }
        sim
    };
    let a = run(seeded(&dir).await);
    let b = run(seeded(&dir).await);
    assert_eq!(a.results(), b.results());
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn broken_catalog_fails_seeding() {
    let dir = plant_data("broken");
    dir.write("workplaces.json", "[]");
    let config = find_config(dir.path()).unwrap();
    let catalog = FileCatalog::new(dir.path());
    let err = seed_simulation("room-1", &config, &catalog, &catalog)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("conflicting formats"));
}
