//! PlantSim Core -- the state engine for a turn-based factory-management
//! training simulation.
//!
//! A player configures a virtual plant across at most four steps. Each step
//! has its own configuration snapshot; advancing derives that step's results
//! and carries the configuration forward. Full history is kept.
//!
//! # Step advance
//!
//! Each call to [`simulation::Simulation::advance_step`]:
//!
//! 1. Computes the next result step from the number of completed steps.
//! 2. Returns early (no-op) if results for that step already exist.
//! 3. Derives results from the latest parameters via a
//!    [`metrics::MetricsDeriver`].
//! 4. Clones the latest parameters forward unless the step ceiling is hit.
//!
//! ```rust,ignore
//! let mut sim = Simulation::new("room-1", SimulationParameters::new(10_000_000));
//! sim.current_parameters_mut().unwrap().increase_material_warehouse_size(50)?;
//! sim.advance_step(&mut HeuristicDeriver::new(config.rng_seed))?;
//! ```
//!
//! # Key Types
//!
//! - [`simulation::Simulation`] -- history of parameters and results, and the
//!   step-advance state machine.
//! - [`params::SimulationParameters`] -- one step's configuration and its
//!   validating mutation API.
//! - [`graph::ProcessGraph`] -- identity-keyed workplaces and routes.
//! - [`warehouse::Warehouse`] -- capacity-bounded material ledger.
//! - [`schedule::ProductionSchedule`] -- one plan row per accepted tender.
//! - [`record`] -- flat key-value records for external caches.
//! - [`serialize`] -- versioned binary snapshots via bitcode.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for ratios.

pub mod catalog;
pub mod commerce;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod fixed;
pub mod graph;
pub mod id;
pub mod improvement;
pub mod metrics;
pub mod params;
pub mod query;
pub mod record;
pub mod resource;
pub mod rng;
pub mod schedule;
pub mod serialize;
pub mod sim;
pub mod simulation;
pub mod warehouse;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{ErrorKind, SimError, SimResult};
pub use params::SimulationParameters;
pub use simulation::Simulation;
