//! Spreadsheet engine API.
//!
//! This module provides the computation side of the cell store:
//!
//! - [`Cell`], [`CellKind`] - Cell contents and cached values
//! - [`parse_number`] - Numeric literal classification
//! - [`CellId`] - Opaque identifiers (with optional A1-style validation)
//! - [`Expr`], [`parse_formula`] - Formula expression trees and their parser
//! - [`evaluate`], [`ValueLookup`] - Expression evaluation
//! - [`DepGraph`] - Upstream/downstream links kept acyclic
//! - [`detect_cycle`] - Circular dependency detection
//! - [`format_number`] - Format values for display

mod cell;
mod cell_id;
mod cycle;
mod eval;
mod expr;
mod format;
mod graph;
mod parse;

pub use cell::{Cell, CellKind, parse_number};
pub use cell_id::{CellId, InvalidCellId};
pub use cycle::{CycleError, detect_cycle};
pub use eval::{EvalError, ValueLookup, evaluate};
pub use expr::{BinaryOp, Expr};
pub use format::{ERROR_MARKER, format_number, format_value};
pub use graph::DepGraph;
pub use parse::{FORMULA_PREFIX, MAX_NESTING, ParseError, parse_formula};
