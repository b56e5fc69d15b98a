use crate::models::Operation;
use crate::scrapers::types::ScrapeParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Run configuration, built once in `main` and passed down
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scrape: ScrapeParams,
    pub paths: DataPaths,
}

impl Config {
    /// Defaults, optionally overlaid with a JSON file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Where raw and processed CSVs live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub data_dir: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl DataPaths {
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    pub fn raw_file_name(operation: Operation) -> String {
        format!("madrid_{}_properties_raw.csv", operation.slug())
    }

    pub fn processed_file_name(operation: Operation) -> String {
        format!("madrid_{}_properties_processed.csv", operation.slug())
    }

    pub fn raw_csv(&self, operation: Operation) -> PathBuf {
        self.raw_dir().join(Self::raw_file_name(operation))
    }

    pub fn processed_csv(&self, operation: Operation) -> PathBuf {
        self.processed_dir().join(Self::processed_file_name(operation))
    }

    /// Raw output path; falls back to the bare file name in the current
    /// directory when the raw directory cannot be created.
    pub fn prepare_raw_output(&self, operation: Operation) -> PathBuf {
        let dir = self.raw_dir();
        match std::fs::create_dir_all(&dir) {
            Ok(()) => dir.join(Self::raw_file_name(operation)),
            Err(e) => {
                warn!(
                    "Could not create {} ({}); saving to the current directory",
                    dir.display(),
                    e
                );
                PathBuf::from(Self::raw_file_name(operation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_operation() {
        let paths = DataPaths::default();
        assert_eq!(
            paths.raw_csv(Operation::Rental),
            PathBuf::from("data/raw/madrid_rental_properties_raw.csv")
        );
        assert_eq!(
            paths.processed_csv(Operation::Sale),
            PathBuf::from("data/processed/madrid_sale_properties_processed.csv")
        );
    }

    #[test]
    fn raw_output_falls_back_when_directory_is_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let paths = DataPaths { data_dir: blocker };
        assert_eq!(
            paths.prepare_raw_output(Operation::Sale),
            PathBuf::from("madrid_sale_properties_raw.csv")
        );

        let ok = DataPaths { data_dir: dir.path().join("data") };
        let target = ok.prepare_raw_output(Operation::Sale);
        assert!(target.parent().unwrap().is_dir());
    }

    #[test]
    fn config_file_overrides_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"scrape":{"operation":"rental","max_pages":3},"paths":{"data_dir":"/tmp/pisos"}}"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.scrape.operation, Operation::Rental);
        assert_eq!(config.scrape.max_pages, Some(3));
        assert_eq!(config.scrape.listing_timeout_secs, 10);
        assert_eq!(config.paths.data_dir, PathBuf::from("/tmp/pisos"));
    }
}
