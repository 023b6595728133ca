//! Null value handling for CSV cells

use serde::{Serialize, Deserialize};

/// Which raw cell texts count as missing values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullConfig {
    /// Patterns to treat as null
    pub patterns: Vec<String>,

    /// Whether to trim whitespace before checking
    pub trim_whitespace: bool,

    /// Case sensitive matching
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                String::new(),
                "-".to_string(),
                "N/A".to_string(),
                "null".to_string(),
                "None".to_string(),
            ],
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// A config where only the empty cell is null
    pub fn empty_only() -> Self {
        Self {
            patterns: vec![String::new()],
            ..Self::default()
        }
    }

    /// Check if a cell should be treated as null
    pub fn is_null(&self, cell: &str) -> bool {
        let test_value = if self.trim_whitespace {
            cell.trim()
        } else {
            cell
        };

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                test_value == pattern
            } else {
                test_value.eq_ignore_ascii_case(pattern)
            }
        })
    }

    /// Add a null pattern
    pub fn add_pattern(&mut self, pattern: impl Into<String>) {
        let pattern = pattern.into();
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }
}
