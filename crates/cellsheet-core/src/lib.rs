//! cellsheet-core - Reactive cell store.

pub mod document;
pub mod error;

pub use document::{Propagation, Sheet};
pub use error::{Result, SheetError};

pub use cellsheet_engine::engine::{Cell, CellId, CellKind};
