//! Criterion benchmarks for the PlantSim state engine.
//!
//! Two benchmark groups:
//! - `full_session`: seed a plant and run all four steps with the heuristic
//!   deriver.
//! - `large_plant`: a single advance over a plant with hundreds of
//!   workplaces, suppliers, and tenders.

use criterion::{Criterion, criterion_group, criterion_main};
use plantsim_core::commerce::Supplier;
use plantsim_core::graph::{ProcessGraph, Route, Workplace};
use plantsim_core::metrics::HeuristicDeriver;
use plantsim_core::record::ToRecord;
use plantsim_core::test_utils::*;
use plantsim_core::{Simulation, SimulationParameters};

// ===========================================================================
// Plant builders
// ===========================================================================

/// 400 workplaces in 80 chains of 5, every other one staffed and equipped,
/// 50 suppliers, 100 tenders.
fn build_large_plant() -> SimulationParameters {
    let mut p = SimulationParameters::new(1_000_000_000);

    let mut workplaces = Vec::new();
    let mut routes = Vec::new();
    for chain in 0..80 {
        for link in 0..5 {
            let id = format!("wp-{chain}-{link}");
            let mut w = Workplace::new(id.as_str(), format!("Station {chain}/{link}"));
            if link % 2 == 0 {
                w.worker = Some(worker(&format!("w-{chain}-{link}"), "operator"));
                w.equipment = Some(equipment(&format!("eq-{chain}-{link}")));
            }
            workplaces.push(w);
            if link > 0 {
                routes.push(Route::new(format!("wp-{chain}-{}", link - 1), id));
            }
        }
    }
    *p.process_graph_mut() = ProcessGraph::with_contents("large", workplaces, routes);

    for i in 0..50 {
        p.add_supplier(Supplier {
            cost: 1_000 + i,
            ..supplier(&format!("s-{i}"))
        })
        .unwrap();
    }
    for i in 0..100 {
        p.add_tender(tender(&format!("t-{i}"), 10 + i)).unwrap();
    }
    p
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_full_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_session");

    group.bench_function("four_steps_staffed", |b| {
        b.iter(|| {
            let mut sim = Simulation::with_id("bench", "room", staffed_parameters());
            let mut deriver = HeuristicDeriver::new(7);
            while !sim.is_completed() {
                sim.advance_step(&mut deriver).unwrap();
            }
            sim
        });
    });

    group.finish();
}

fn bench_large_plant(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_plant");
    let plant = build_large_plant();

    group.bench_function("advance_once", |b| {
        b.iter(|| {
            let mut sim = Simulation::with_id("bench", "room", plant.clone());
            sim.advance_step(&mut HeuristicDeriver::new(7)).unwrap();
            sim
        });
    });

    group.bench_function("fingerprint", |b| {
        b.iter(|| plant.fingerprint());
    });

    group.bench_function("to_record", |b| {
        b.iter(|| plant.to_record());
    });

    group.finish();
}

criterion_group!(benches, bench_full_session, bench_large_plant);
criterion_main!(benches);
