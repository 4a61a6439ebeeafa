//! File loading: format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers, plus engine configuration loading.

use plantsim_core::config::SimulationConfig;
use plantsim_core::error::SimError;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base name of the engine configuration file.
pub const CONFIG_BASE_NAME: &str = "plantsim";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The file parsed but its contents were rejected by the engine.
    #[error("invalid contents in {file}: {source}")]
    Invalid {
        file: PathBuf,
        #[source]
        source: SimError,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let ext = path.extension().and_then(|e| e.to_str());
    Format::ALL
        .into_iter()
        .find(|f| Some(f.extension()) == ext)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan a directory for a data file with the given base name (without extension).
///
/// Looks for `{base_name}.ron`, `{base_name}.toml`, and `{base_name}.json`.
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// multiple formats exist for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;

    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but returns an error if no file is found.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| parse_error(path, e)),
    }
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. For RON and JSON, deserializes
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| parse_error(path, e)),
        Format::Toml => {
            let table: toml::Value = toml::from_str(&content).map_err(|e| parse_error(path, e))?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| parse_error(path, format!("missing key '{toml_key}' in TOML file")))?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| parse_error(path, e))
        }
    }
}

// ===========================================================================
// Engine configuration
// ===========================================================================

/// Load and validate an engine configuration file. Missing fields take
/// their defaults.
pub fn load_config(path: &Path) -> Result<SimulationConfig, DataLoadError> {
    let config: SimulationConfig = deserialize_file(path)?;
    config.validate().map_err(|source| DataLoadError::Invalid {
        file: path.to_path_buf(),
        source,
    })?;
    debug!(file = %path.display(), capital = config.initial_capital, "config loaded");
    Ok(config)
}

/// Load `plantsim.{ron,toml,json}` from `dir`, or the default configuration
/// if none exists.
pub fn find_config(dir: &Path) -> Result<SimulationConfig, DataLoadError> {
    match find_data_file(dir, CONFIG_BASE_NAME)? {
        Some(path) => load_config(&path),
        None => {
            debug!(dir = %dir.display(), "no config file, using defaults");
            Ok(SimulationConfig::default())
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use plantsim_core::commerce::{DistributionStrategy, SalesStrategy};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Create a fresh temporary directory for a test.
    pub(crate) fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "plantsim_data_test_{}_{}_{}",
            std::process::id(),
            suffix,
            DIR_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub(crate) fn cleanup(dir: &Path) {
        let _ = std::fs::remove_dir_all(dir);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Entry {
        name: String,
        value: u32,
    }

    // -----------------------------------------------------------------------
    // Format detection
    // -----------------------------------------------------------------------

    #[test]
    fn detect_known_formats() {
        assert_eq!(detect_format(Path::new("a.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("dir/a.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), Format::Json);
    }

    #[test]
    fn detect_format_unsupported() {
        let err = detect_format(Path::new("a.yaml")).unwrap_err();
        assert!(matches!(err, DataLoadError::UnsupportedFormat { .. }));
        assert!(detect_format(Path::new("plantsim")).is_err());
    }

    // -----------------------------------------------------------------------
    // File discovery
    // -----------------------------------------------------------------------

    #[test]
    fn find_data_file_found_and_missing() {
        let dir = make_test_dir("find");
        std::fs::write(dir.join("workplaces.toml"), "").unwrap();
        assert_eq!(
            find_data_file(&dir, "workplaces").unwrap(),
            Some(dir.join("workplaces.toml"))
        );
        assert_eq!(find_data_file(&dir, "lean_improvements").unwrap(), None);
        cleanup(&dir);
    }

    #[test]
    fn find_data_file_conflict() {
        let dir = make_test_dir("conflict");
        std::fs::write(dir.join("workplaces.ron"), "[]").unwrap();
        std::fs::write(dir.join("workplaces.json"), "[]").unwrap();
        let err = find_data_file(&dir, "workplaces").unwrap_err();
        assert!(matches!(err, DataLoadError::ConflictingFormats { .. }));
        cleanup(&dir);
    }

    #[test]
    fn require_data_file_missing() {
        let dir = make_test_dir("require");
        let err = require_data_file(&dir, "workplaces").unwrap_err();
        match err {
            DataLoadError::MissingRequired { file, .. } => assert_eq!(file, "workplaces"),
            other => panic!("unexpected error: {other}"),
        }
        cleanup(&dir);
    }

    // -----------------------------------------------------------------------
    // Deserialization
    // -----------------------------------------------------------------------

    #[test]
    fn deserialize_list_all_formats() {
        let dir = make_test_dir("lists");
        let ron_path = dir.join("a.ron");
        let json_path = dir.join("b.json");
        let toml_path = dir.join("c.toml");
        std::fs::write(&ron_path, r#"[(name: "x", value: 1)]"#).unwrap();
        std::fs::write(&json_path, r#"[{"name": "x", "value": 1}]"#).unwrap();
        std::fs::write(&toml_path, "[[entries]]\nname = \"x\"\nvalue = 1\n").unwrap();

        let expected = vec![Entry {
            name: "x".into(),
            value: 1,
        }];
        assert_eq!(deserialize_list::<Entry>(&ron_path, "entries").unwrap(), expected);
        assert_eq!(deserialize_list::<Entry>(&json_path, "entries").unwrap(), expected);
        assert_eq!(deserialize_list::<Entry>(&toml_path, "entries").unwrap(), expected);
        cleanup(&dir);
    }

    #[test]
    fn deserialize_list_toml_missing_key() {
        let dir = make_test_dir("toml_key");
        let path = dir.join("c.toml");
        std::fs::write(&path, "[[other]]\nname = \"x\"\nvalue = 1\n").unwrap();
        let err = deserialize_list::<Entry>(&path, "entries").unwrap_err();
        match err {
            DataLoadError::Parse { detail, .. } => assert!(detail.contains("entries")),
            other => panic!("unexpected error: {other}"),
        }
        cleanup(&dir);
    }

    #[test]
    fn deserialize_file_parse_error() {
        let dir = make_test_dir("parse");
        let path = dir.join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = deserialize_file::<Entry>(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Parse { .. }));
        cleanup(&dir);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = deserialize_file::<Entry>(Path::new("/nonexistent/plantsim.json")).unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }

    // -----------------------------------------------------------------------
    // Config
    // -----------------------------------------------------------------------

    #[test]
    fn load_config_toml_partial() {
        let dir = make_test_dir("config_toml");
        let path = dir.join("plantsim.toml");
        std::fs::write(
            &path,
            "initial_capital = 750000\ndefault_distribution_strategy = \"RETAIL\"\n",
        )
        .unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.initial_capital, 750_000);
        assert_eq!(config.default_distribution_strategy, DistributionStrategy::Retail);
        assert_eq!(config.default_sales_strategy, SalesStrategy::default());
        assert_eq!(config.materials_warehouse_capacity, 1000);
        cleanup(&dir);
    }

    #[test]
    fn load_config_ron() {
        let dir = make_test_dir("config_ron");
        let path = dir.join("plantsim.ron");
        std::fs::write(&path, "(rng_seed: 9, products_warehouse_capacity: 50)").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.rng_seed, 9);
        assert_eq!(config.products_warehouse_capacity, 50);
        cleanup(&dir);
    }

    #[test]
    fn load_config_rejects_negative_capital() {
        let dir = make_test_dir("config_invalid");
        let path = dir.join("plantsim.json");
        std::fs::write(&path, r#"{"initial_capital": -10}"#).unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Invalid { .. }));
        cleanup(&dir);
    }

    #[test]
    fn load_config_rejects_unknown_strategy() {
        let dir = make_test_dir("config_tag");
        let path = dir.join("plantsim.json");
        std::fs::write(&path, r#"{"default_sales_strategy": "FREE_STUFF"}"#).unwrap();
        assert!(matches!(
            load_config(&path).unwrap_err(),
            DataLoadError::Parse { .. }
        ));
        cleanup(&dir);
    }

    #[test]
    fn find_config_defaults_and_conflicts() {
        let dir = make_test_dir("find_config");
        assert_eq!(find_config(&dir).unwrap(), SimulationConfig::default());

        std::fs::write(dir.join("plantsim.json"), r#"{"rng_seed": 3}"#).unwrap();
        assert_eq!(find_config(&dir).unwrap().rng_seed, 3);

        std::fs::write(dir.join("plantsim.ron"), "(rng_seed: 1)").unwrap();
        assert!(matches!(
            find_config(&dir).unwrap_err(),
            DataLoadError::ConflictingFormats { .. }
        ));
        cleanup(&dir);
    }

    #[test]
    fn error_display_messages() {
        let err = DataLoadError::MissingRequired {
            file: "workplaces".into(),
            dir: PathBuf::from("/data"),
        };
        assert_eq!(err.to_string(), "required file 'workplaces' not found in /data");

        let err = DataLoadError::UnsupportedFormat {
            file: PathBuf::from("x.yaml"),
        };
        assert_eq!(err.to_string(), "unsupported format for file: x.yaml");
    }
}
