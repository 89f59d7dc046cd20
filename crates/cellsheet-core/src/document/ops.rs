use super::{Propagation, Sheet};
use crate::error::Result;
use cellsheet_engine::engine::{Cell, CellId};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::hash::Hash;
use tracing::{debug, trace};

impl Sheet {
    /// Set cell contents from input text.
    ///
    /// Empty, blank, or absent text deletes the cell. Otherwise the text is
    /// classified, its references are registered in the dependency graph,
    /// and the cell plus everything downstream of it is recomputed. A syntax
    /// error or a dependency cycle leaves the store exactly as it was.
    pub fn set_cell<'a>(
        &mut self,
        id: impl Into<CellId>,
        text: impl Into<Option<&'a str>>,
    ) -> Result<()> {
        let id = id.into();
        let Some(text) = text.into().filter(|t| !t.trim().is_empty()) else {
            self.delete_cell(id);
            return Ok(());
        };

        let cell = Cell::from_input(text)?;
        self.graph.add(&id, cell.referenced_ids())?;

        debug!(cell = %id, kind = %cell.kind(), "set cell");
        self.cells.insert(id.clone(), cell);
        self.recompute_cell(&id);
        self.propagate(&id);
        Ok(())
    }

    /// Delete a cell and recompute whatever read it. Absent cells are a no-op
    /// apart from refreshing their dependents.
    pub fn delete_cell(&mut self, id: impl Into<CellId>) {
        let id = id.into();
        if self.cells.remove(&id).is_some() {
            debug!(cell = %id, "deleted cell");
        }
        self.propagate(&id);
        self.graph.remove(&id);
    }

    /// Display text of a cell, or "" if it is absent.
    pub fn display_string<Q>(&self, id: &Q) -> String
    where
        CellId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cells
            .get(id)
            .map(Cell::display_text)
            .unwrap_or_default()
    }

    /// Raw (trimmed) contents of a cell, or "" if it is absent.
    pub fn contents<Q>(&self, id: &Q) -> String
    where
        CellId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cells
            .get(id)
            .map(|cell| cell.contents().to_string())
            .unwrap_or_default()
    }

    /// Identifiers `id` reads from.
    pub fn upstream_of<Q>(&self, id: &Q) -> &BTreeSet<CellId>
    where
        CellId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.graph.upstream_of(id)
    }

    /// Identifiers that read `id`.
    pub fn downstream_of<Q>(&self, id: &Q) -> &BTreeSet<CellId>
    where
        CellId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.graph.downstream_of(id)
    }

    /// Recompute one cell against the rest of the store.
    /// Returns false if the cell is absent.
    fn recompute_cell(&mut self, id: &CellId) -> bool {
        // The graph is acyclic, so a cell never needs its own value; take it
        // out of the map while it reads the others.
        let Some(mut cell) = self.cells.remove(id) else {
            return false;
        };
        let changed = cell.recompute(&self.cells);
        trace!(cell = %id, changed, "recomputed");
        self.cells.insert(id.clone(), cell);
        true
    }

    /// Recompute everything transitively downstream of `id`.
    fn propagate(&mut self, id: &CellId) {
        match self.propagation {
            Propagation::Topological => {
                let order = self.graph.downstream_order(id);
                debug!(cell = %id, dependents = order.len(), "propagating");
                for next in &order {
                    self.recompute_cell(next);
                }
            }
            Propagation::FanOut => {
                let mut pending: Vec<CellId> =
                    self.graph.downstream_of(id).iter().rev().cloned().collect();
                let mut visits = 0usize;
                while let Some(next) = pending.pop() {
                    // Absent cells end the cascade along this path.
                    if self.recompute_cell(&next) {
                        visits += 1;
                        pending.extend(self.graph.downstream_of(&next).iter().rev().cloned());
                    }
                }
                debug!(cell = %id, visits, "propagated");
            }
        }
    }
}
