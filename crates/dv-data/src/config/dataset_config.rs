//! Dataset configuration files

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use dv_core::{ColumnKind, ColumnSpec};
use serde::{Serialize, Deserialize};

use super::null_handling::NullConfig;
use crate::DataError;

/// On-disk format of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Json,
    Csv,
}

impl FileFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(FileFormat::Json),
            "csv" => Some(FileFormat::Csv),
            _ => None,
        }
    }
}

/// Configuration for loading one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the data file
    pub path: PathBuf,

    /// File format; guessed from the extension when absent
    pub format: Option<FileFormat>,

    /// Display name; defaults to the file name
    pub name: Option<String>,

    /// Explicit column list; inferred from the data when empty
    pub columns: Vec<ColumnSpec>,

    /// Kind overrides applied on top of inferred columns
    pub column_kinds: HashMap<String, ColumnKind>,

    /// Header overrides applied on top of inferred columns
    pub headers: HashMap<String, String>,

    /// Null handling for CSV cells
    pub null_config: NullConfig,

    /// Number of records sampled for kind inference
    pub sample_size: usize,

    /// Most distinct values a column may have to be inferred as categorical
    pub categorical_max_distinct: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            format: None,
            name: None,
            columns: Vec::new(),
            column_kinds: HashMap::new(),
            headers: HashMap::new(),
            null_config: NullConfig::default(),
            sample_size: 1000,
            categorical_max_distinct: 50,
        }
    }
}

impl DatasetConfig {
    /// Create a configuration for a data file with everything else inferred
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Read a configuration file
    ///
    /// A relative data path is resolved against the configuration file's
    /// directory.
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let reader = BufReader::new(File::open(path)?);
        let mut config: DatasetConfig = serde_json::from_reader(reader)?;

        if config.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.path = dir.join(&config.path);
            }
        }

        Ok(config)
    }

    /// Get the file name
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string()
    }

    /// Name shown for the dataset
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.file_name())
    }

    /// Format to read the file with
    pub fn resolved_format(&self) -> Result<FileFormat, DataError> {
        self.format
            .or_else(|| FileFormat::from_path(&self.path))
            .ok_or_else(|| DataError::UnsupportedFormat(self.path.display().to_string()))
    }

    /// Apply kind and header overrides to detected columns
    pub fn apply_overrides(&self, columns: Vec<ColumnSpec>) -> Vec<ColumnSpec> {
        columns
            .into_iter()
            .map(|mut column| {
                if let Some(kind) = self.column_kinds.get(&column.id) {
                    column.kind = *kind;
                }
                if let Some(header) = self.headers.get(&column.id) {
                    column.header = Some(header.clone());
                }
                column
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_path(Path::new("data/products.JSON")), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_path(Path::new("products.csv")), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_path(Path::new("products.parquet")), None);
    }

    #[test]
    fn test_unknown_format_is_an_error() {
        let config = DatasetConfig::new("products.xlsx");
        assert!(matches!(config.resolved_format(), Err(DataError::UnsupportedFormat(_))));

        let config = DatasetConfig {
            format: Some(FileFormat::Csv),
            ..DatasetConfig::new("products.txt")
        };
        assert_eq!(config.resolved_format().unwrap(), FileFormat::Csv);
    }

    #[test]
    fn test_config_file_resolves_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("products.dataset.json");
        let mut file = File::create(&config_path).unwrap();
        write!(
            file,
            r#"{{"path": "products.json", "column_kinds": {{"id": "text"}}, "headers": {{"sale_price": "Sales Price"}}}}"#
        )
        .unwrap();

        let config = DatasetConfig::from_file(&config_path).unwrap();
        assert_eq!(config.path, dir.path().join("products.json"));
        assert_eq!(config.sample_size, 1000);
        assert_eq!(config.display_name(), "products.json");

        let columns = config.apply_overrides(vec![
            ColumnSpec::numeric("id"),
            ColumnSpec::numeric("sale_price"),
        ]);
        assert_eq!(columns[0].kind, ColumnKind::Text);
        assert_eq!(columns[1].header(), "Sales Price");
    }
}
