//! cellsheet_engine - Formula parsing, evaluation and the dependency graph.

pub mod engine;
