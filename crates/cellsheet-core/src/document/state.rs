use cellsheet_engine::engine::{Cell, CellId, DepGraph};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How recomputation travels downstream after an edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Recompute every transitively downstream cell once, in dependency order.
    #[default]
    Topological,
    /// Cascade along every edge, recomputing shared dependents once per path.
    FanOut,
}

impl FromStr for Propagation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topological" | "topo" => Ok(Propagation::Topological),
            "fan-out" | "fanout" => Ok(Propagation::FanOut),
            other => Err(format!(
                "unknown propagation '{}' (expected 'topological' or 'fan-out')",
                other
            )),
        }
    }
}

impl fmt::Display for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Propagation::Topological => "topological",
            Propagation::FanOut => "fan-out",
        })
    }
}

/// In-memory reactive cell store.
///
/// Owns every cell and the dependency graph between them; formula cells are
/// recomputed whenever something they read changes.
#[derive(Clone, Debug, Default)]
pub struct Sheet {
    /// Cells by identifier
    pub(crate) cells: HashMap<CellId, Cell>,
    /// Upstream/downstream links between formula cells and what they read
    pub(crate) graph: DepGraph,
    /// Downstream recompute strategy
    pub(crate) propagation: Propagation,
}

impl Sheet {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store using the given propagation strategy.
    pub fn with_propagation(propagation: Propagation) -> Self {
        Sheet {
            propagation,
            ..Self::default()
        }
    }

    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    pub fn cell(&self, id: &CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Identifiers of all present cells, sorted.
    pub fn ids(&self) -> Vec<CellId> {
        let mut ids: Vec<CellId> = self.cells.keys().cloned().collect();
        ids.sort();
        ids
    }
}
