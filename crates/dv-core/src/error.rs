//! Engine construction errors

use thiserror::Error;

/// Errors raised while setting up a table engine
///
/// Applying state to records never fails; only an inconsistent column set does.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),
    
    #[error("Column id must not be empty")]
    EmptyColumnId,
}
