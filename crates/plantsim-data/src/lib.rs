//! File-backed collaborators for the PlantSim engine: data file loading,
//! reference data catalogs, engine configuration, and logging setup.

pub mod catalog;
pub mod loader;
pub mod logging;
pub mod schema;

pub use catalog::FileCatalog;
pub use loader::{DataLoadError, find_config, load_config};
