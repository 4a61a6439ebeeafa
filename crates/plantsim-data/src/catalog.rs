//! File-backed reference data catalogs.
//!
//! A catalog directory holds up to three list files, each in RON, TOML, or
//! JSON:
//!
//! | Base name                  | Required | TOML key                   |
//! |----------------------------|----------|----------------------------|
//! | `lean_improvements`        | yes      | `lean_improvements`        |
//! | `production_improvements`  | no       | `production_improvements`  |
//! | `workplaces`               | yes      | `workplaces`               |
//!
//! Files are read on every request, so edits show up in the next seeded
//! simulation without a restart.

use crate::loader::{DataLoadError, deserialize_list, find_data_file, require_data_file};
use crate::schema::{ImprovementData, WorkplaceData};
use async_trait::async_trait;
use plantsim_core::catalog::{CatalogError, ImprovementCatalog, WorkplaceCatalog};
use plantsim_core::graph::Workplace;
use plantsim_core::improvement::LeanImprovement;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const LEAN_IMPROVEMENTS: &str = "lean_improvements";
pub const PRODUCTION_IMPROVEMENTS: &str = "production_improvements";
pub const WORKPLACES: &str = "workplaces";

impl From<DataLoadError> for CatalogError {
    fn from(err: DataLoadError) -> Self {
        match err {
            DataLoadError::Parse { .. } | DataLoadError::Invalid { .. } => {
                CatalogError::Malformed(err.to_string())
            }
            other => CatalogError::Unavailable(other.to_string()),
        }
    }
}

/// Improvement and workplace catalogs read from a directory of data files.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    dir: PathBuf,
}

impl FileCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_improvements(path: &Path, key: &str) -> Result<Vec<LeanImprovement>, CatalogError> {
        let data: Vec<ImprovementData> = deserialize_list(path, key)?;
        let improvements = data
            .into_iter()
            .map(|d| match d.gain() {
                Some(gain) => Ok(d.into_improvement(gain)),
                None => Err(CatalogError::Malformed(format!(
                    "improvement '{}' in {}: efficiency_gain {} outside [0, 1]",
                    d.id,
                    path.display(),
                    d.efficiency_gain
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(file = %path.display(), count = improvements.len(), "improvements loaded");
        Ok(improvements)
    }
}

#[async_trait]
impl ImprovementCatalog for FileCatalog {
    async fn lean_improvements(&self) -> Result<Vec<LeanImprovement>, CatalogError> {
        let path = require_data_file(&self.dir, LEAN_IMPROVEMENTS)?;
        Self::load_improvements(&path, LEAN_IMPROVEMENTS)
    }

    async fn production_improvements(&self) -> Result<Vec<LeanImprovement>, CatalogError> {
        match find_data_file(&self.dir, PRODUCTION_IMPROVEMENTS)? {
            Some(path) => Self::load_improvements(&path, PRODUCTION_IMPROVEMENTS),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl WorkplaceCatalog for FileCatalog {
    async fn workplaces(&self) -> Result<Vec<Workplace>, CatalogError> {
        let path = require_data_file(&self.dir, WORKPLACES)?;
        let data: Vec<WorkplaceData> = deserialize_list(&path, WORKPLACES)?;
        debug!(file = %path.display(), count = data.len(), "workplaces loaded");
        Ok(data.into_iter().map(Workplace::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::tests::{cleanup, make_test_dir};
    use plantsim_core::catalog::seed_parameters;
    use plantsim_core::config::SimulationConfig;
    use plantsim_core::fixed::ratio;

    fn write_catalog(dir: &Path) {
        std::fs::write(
            dir.join("lean_improvements.ron"),
            r#"[
                (id: "5s", name: Some("5S"), cost: 50000, efficiency_gain: 0.05),
                (id: "kanban", cost: 80000, efficiency_gain: 0.125),
            ]"#,
        )
        .unwrap();
        std::fs::write(
            dir.join("workplaces.toml"),
            r#"
[[workplaces]]
id = "wp-cut"
name = "Cutting"
speciality = "cutter"
stages = ["cut"]

[[workplaces]]
id = "wp-weld"
name = "Welding"
x = 3
y = 1
"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn loads_improvements_and_workplaces() {
        let dir = make_test_dir("catalog");
        write_catalog(&dir);
        let catalog = FileCatalog::new(&dir);

        let lean = catalog.lean_improvements().await.unwrap();
        assert_eq!(lean.len(), 2);
        assert_eq!(lean[0].name, "5S");
        assert_eq!(lean[1].name, "kanban");
        assert_eq!(lean[1].efficiency_gain, ratio(1, 8));

        assert!(catalog.production_improvements().await.unwrap().is_empty());

        let workplaces = catalog.workplaces().await.unwrap();
        assert_eq!(workplaces.len(), 2);
        assert_eq!(workplaces[0].required_speciality, "cutter");
        assert_eq!(workplaces[1].x, Some(3));
        cleanup(&dir);
    }

    #[tokio::test]
    async fn optional_production_improvements() {
        let dir = make_test_dir("catalog_prod");
        write_catalog(&dir);
        std::fs::write(
            dir.join("production_improvements.json"),
            r#"[{"id": "robot-arm", "name": "Robot arm", "cost": 300000, "efficiency_gain": 0.2}]"#,
        )
        .unwrap();
        let catalog = FileCatalog::new(&dir);
        let prod = catalog.production_improvements().await.unwrap();
        assert_eq!(prod.len(), 1);
        assert_eq!(prod[0].improvement_id.as_str(), "robot-arm");
        cleanup(&dir);
    }

    #[tokio::test]
    async fn missing_required_file_is_unavailable() {
        let dir = make_test_dir("catalog_missing");
        let catalog = FileCatalog::new(&dir);
        assert!(matches!(
            catalog.lean_improvements().await.unwrap_err(),
            CatalogError::Unavailable(_)
        ));
        assert!(matches!(
            catalog.workplaces().await.unwrap_err(),
            CatalogError::Unavailable(_)
        ));
        cleanup(&dir);
    }

    #[tokio::test]
    async fn bad_entries_are_malformed() {
        let dir = make_test_dir("catalog_bad");
        std::fs::write(dir.join("lean_improvements.json"), r#"[{"name": "no id"}]"#).unwrap();
        std::fs::write(
            dir.join("production_improvements.json"),
            r#"[{"id": "x", "efficiency_gain": 4.0}]"#,
        )
        .unwrap();
        let catalog = FileCatalog::new(&dir);
        assert!(matches!(
            catalog.lean_improvements().await.unwrap_err(),
            CatalogError::Malformed(_)
        ));
        match catalog.production_improvements().await.unwrap_err() {
            CatalogError::Malformed(msg) => assert!(msg.contains("outside [0, 1]")),
            other => panic!("unexpected error: {other}"),
        }
        cleanup(&dir);
    }

    #[tokio::test]
    async fn seeds_parameters_from_files() {
        let dir = make_test_dir("catalog_seed");
        write_catalog(&dir);
        let catalog = FileCatalog::new(&dir);
        let params = seed_parameters(&SimulationConfig::default(), &catalog, &catalog)
            .await
            .unwrap();
        assert_eq!(params.lean_improvements().len(), 2);
        assert_eq!(params.process_graph().workplace_count(), 2);
        assert_eq!(params.process_graph().route_count(), 0);
        cleanup(&dir);
    }
}
