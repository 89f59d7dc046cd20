//! Error types for Cellsheet core.

use thiserror::Error;

use cellsheet_engine::engine::{CycleError, ParseError};

/// Errors surfaced by store mutations. Either one leaves the store untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

pub type Result<T> = std::result::Result<T, SheetError>;
