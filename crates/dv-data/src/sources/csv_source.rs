use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use csv::ReaderBuilder;
use dv_core::{Record, Value};
use tracing::{debug, info};

use super::RecordSource;
use crate::config::NullConfig;
use crate::DataError;

/// CSV data source for loading headered CSV files
pub struct CsvSource {
    /// Path to the CSV file
    path: PathBuf,
    /// File name shown in logs
    name: String,
    /// Which cells count as missing
    null_config: NullConfig,
}

impl CsvSource {
    /// Create a new CSV source from a file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
            .to_string();
        Self {
            path,
            name,
            null_config: NullConfig::default(),
        }
    }

    /// Use a custom null configuration
    pub fn with_null_config(mut self, null_config: NullConfig) -> Self {
        self.null_config = null_config;
        self
    }

    /// Parse records from any reader
    ///
    /// Null cells become `Value::Null`. A column whose every non-null cell
    /// parses as a number is stored as numbers; everything else stays text.
    pub fn read_records<R: Read>(reader: R, null_config: &NullConfig) -> Result<Vec<Record>, DataError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows: Vec<Vec<Option<String>>> = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let cells = headers
                .iter()
                .enumerate()
                .map(|(idx, _)| {
                    record
                        .get(idx)
                        .filter(|cell| !null_config.is_null(cell))
                        .map(|cell| cell.trim().to_string())
                })
                .collect();
            rows.push(cells);
        }

        let numeric: Vec<bool> = (0..headers.len())
            .map(|idx| Self::is_numeric_column(&rows, idx))
            .collect();
        debug!(
            "Numeric CSV columns: {:?}",
            headers.iter().zip(&numeric).filter(|(_, n)| **n).map(|(h, _)| h).collect::<Vec<_>>()
        );

        Ok(rows
            .into_iter()
            .map(|cells| {
                headers
                    .iter()
                    .zip(cells)
                    .zip(&numeric)
                    .map(|((header, cell), is_numeric)| {
                        let value = match cell {
                            None => Value::Null,
                            Some(text) if *is_numeric => text
                                .parse::<f64>()
                                .map(Value::Number)
                                .unwrap_or(Value::Text(text)),
                            Some(text) => Value::Text(text),
                        };
                        (header.clone(), value)
                    })
                    .collect()
            })
            .collect())
    }

    /// Detect whether a column holds only numbers
    fn is_numeric_column(rows: &[Vec<Option<String>>], col_idx: usize) -> bool {
        let mut seen_value = false;

        for row in rows {
            if let Some(Some(cell)) = row.get(col_idx) {
                match cell.parse::<f64>() {
                    Ok(number) if number.is_finite() => seen_value = true,
                    _ => return false,
                }
            }
        }

        seen_value
    }
}

impl RecordSource for CsvSource {
    fn load(&self) -> Result<Vec<Record>, DataError> {
        let file = File::open(&self.path)?;
        let records = Self::read_records(BufReader::new(file), &self.null_config)?;
        info!("Loaded {} records from {}", records.len(), self.name);
        Ok(records)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PRODUCTS: &str = "\
name,category,price,sale_price,created_at
Widget,Tools,10,N/A,2024-01-03T09:00:00Z
Gadget,Toys,20.5,18,2024-02-14
Widget Pro,Tools,15,,2024-01-20
";

    #[test]
    fn test_numeric_columns_become_numbers() {
        let records = CsvSource::read_records(PRODUCTS.as_bytes(), &NullConfig::default()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].get("price"), &Value::Number(20.5));
        assert_eq!(records[1].get("sale_price"), &Value::Number(18.0));
        assert_eq!(records[0].get("created_at"), &Value::text("2024-01-03T09:00:00Z"));
        assert_eq!(records[2].get("name"), &Value::text("Widget Pro"));
    }

    #[test]
    fn test_null_patterns_become_null() {
        let records = CsvSource::read_records(PRODUCTS.as_bytes(), &NullConfig::default()).unwrap();
        assert!(records[0].get("sale_price").is_null());
        assert!(records[2].get("sale_price").is_null());
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let csv = "code\n1\nA-7\n";
        let records = CsvSource::read_records(csv.as_bytes(), &NullConfig::default()).unwrap();
        assert_eq!(records[0].get("code"), &Value::text("1"));
    }

    #[test]
    fn test_short_rows_fill_with_null() {
        let csv = "name,price\nWidget\n";
        let records = CsvSource::read_records(csv.as_bytes(), &NullConfig::empty_only()).unwrap();
        assert_eq!(records[0].columns().count(), 2);
        assert!(records[0].get("price").is_null());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(PRODUCTS.as_bytes()).unwrap();

        let source = CsvSource::new(file.path()).with_null_config(NullConfig::default());
        assert_eq!(source.load().unwrap().len(), 3);
    }
}
