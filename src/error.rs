//! Error types for the cellsheet command runner

use cellsheet_core::SheetError;
use cellsheet_engine::engine::InvalidCellId;
use thiserror::Error;

/// Errors produced while parsing or running one command line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0:?}")]
    Unknown(String),

    #[error("'{0}' requires a cell identifier")]
    MissingId(&'static str),

    #[error("Unexpected argument after '{command}': {extra:?}")]
    Trailing { command: &'static str, extra: String },

    #[error(transparent)]
    InvalidId(#[from] InvalidCellId),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

pub type Result<T> = std::result::Result<T, CommandError>;
