//! Reference-data collaborators used to seed step-1 parameters.
//!
//! Catalogs are asynchronous because real ones sit in front of a store. Once
//! seeding returns, everything else in the engine is synchronous.

use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::graph::{ProcessGraph, Workplace};
use crate::improvement::LeanImprovement;
use crate::params::SimulationParameters;
use crate::simulation::Simulation;
use async_trait::async_trait;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
    #[error("malformed catalog entry: {0}")]
    Malformed(String),
    #[error(transparent)]
    Sim(#[from] SimError),
}

#[async_trait]
pub trait ImprovementCatalog: Send + Sync {
    /// Every known lean improvement.
    async fn lean_improvements(&self) -> Result<Vec<LeanImprovement>, CatalogError>;

    /// Production improvement options. Catalogs without any return an empty
    /// list.
    async fn production_improvements(&self) -> Result<Vec<LeanImprovement>, CatalogError> {
        Ok(Vec::new())
    }
}

#[async_trait]
pub trait WorkplaceCatalog: Send + Sync {
    /// Every known workplace.
    async fn workplaces(&self) -> Result<Vec<Workplace>, CatalogError>;
}

/// Catalog over fixed in-memory lists.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    pub lean_improvements: Vec<LeanImprovement>,
    pub production_improvements: Vec<LeanImprovement>,
    pub workplaces: Vec<Workplace>,
}

#[async_trait]
impl ImprovementCatalog for InMemoryCatalog {
    async fn lean_improvements(&self) -> Result<Vec<LeanImprovement>, CatalogError> {
        Ok(self.lean_improvements.clone())
    }

    async fn production_improvements(&self) -> Result<Vec<LeanImprovement>, CatalogError> {
        Ok(self.production_improvements.clone())
    }
}

#[async_trait]
impl WorkplaceCatalog for InMemoryCatalog {
    async fn workplaces(&self) -> Result<Vec<Workplace>, CatalogError> {
        Ok(self.workplaces.clone())
    }
}

/// Build step-1 parameters from configuration and catalogs.
///
/// Improvements are reset to not implemented. Workplaces lose any worker or
/// equipment assignment, and the graph starts with no routes.
pub async fn seed_parameters(
    config: &SimulationConfig,
    improvements: &dyn ImprovementCatalog,
    workplaces: &dyn WorkplaceCatalog,
) -> Result<SimulationParameters, CatalogError> {
    config.validate()?;
    let lean = improvements.lean_improvements().await?;
    let production = improvements.production_improvements().await?;
    let nodes = workplaces.workplaces().await?;

    let mut params = SimulationParameters::from_config(config);
    for imp in &lean {
        params.add_lean_improvement(imp.reset())?;
    }
    for imp in &production {
        params.add_production_improvement_option(imp.reset())?;
    }
    *params.process_graph_mut() =
        ProcessGraph::with_contents("", nodes.iter().map(Workplace::unassigned), Vec::new());

    info!(
        lean = params.lean_improvements().len(),
        production = params.production_improvements().len(),
        workplaces = params.process_graph().workplace_count(),
        "parameters seeded from catalogs"
    );
    Ok(params)
}

/// Seed parameters and wrap them in a new simulation for `room_id`.
pub async fn seed_simulation(
    room_id: &str,
    config: &SimulationConfig,
    improvements: &dyn ImprovementCatalog,
    workplaces: &dyn WorkplaceCatalog,
) -> Result<Simulation, CatalogError> {
    let params = seed_parameters(config, improvements, workplaces).await?;
    Ok(Simulation::new(room_id, params))
}
