//! Dependency graph between cells.
//!
//! For a cell X whose formula reads Y, Y is *upstream* of X and X is
//! *downstream* of Y. Both directions are stored and every mutation goes
//! through [`DepGraph`] so they stay exact inverses:
//! `b ∈ upstream[a]` ⟺ `a ∈ downstream[b]`.
//!
//! [`DepGraph::add`] runs [`detect_cycle`] before committing, so the graph is
//! acyclic at all times. Removing a node only drops its own upstream links;
//! nodes that read it keep a (dangling) reference until they are changed.

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use tracing::debug;

use super::cell_id::CellId;
use super::cycle::{CycleError, detect_cycle};

static EMPTY: BTreeSet<CellId> = BTreeSet::new();

/// Bidirectional adjacency between cell identifiers.
#[derive(Clone, Debug, Default)]
pub struct DepGraph {
    upstream: HashMap<CellId, BTreeSet<CellId>>,
    downstream: HashMap<CellId, BTreeSet<CellId>>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the complete set of upstream dependencies of `id`.
    ///
    /// An empty `refs` detaches `id` and never fails. Otherwise the new links
    /// are checked for a cycle through `id`; on failure the previous links
    /// are restored and the offending path is returned.
    pub fn add(&mut self, id: &CellId, refs: BTreeSet<CellId>) -> Result<(), CycleError> {
        if refs.is_empty() {
            self.remove(id);
            return Ok(());
        }

        let previous = self.upstream.insert(id.clone(), refs);
        if let Some(path) = detect_cycle(id, &self.upstream) {
            match previous {
                Some(prev) => {
                    self.upstream.insert(id.clone(), prev);
                }
                None => {
                    self.upstream.remove(id);
                }
            }
            debug!(cell = %id, cycle = ?path, "rejected dependency cycle");
            return Err(CycleError { path });
        }

        let current = &self.upstream[id];
        if let Some(prev) = previous {
            for dropped in prev.difference(current) {
                detach(&mut self.downstream, dropped, id);
            }
        }
        for dep in current {
            self.downstream
                .entry(dep.clone())
                .or_default()
                .insert(id.clone());
        }
        debug!(cell = %id, upstream = current.len(), "dependencies updated");
        Ok(())
    }

    /// Drop every upstream link of `id`. Nodes downstream of `id` are left
    /// as they are.
    pub fn remove(&mut self, id: &CellId) {
        let Some(previous) = self.upstream.remove(id) else {
            return;
        };
        for dep in &previous {
            detach(&mut self.downstream, dep, id);
        }
        debug!(cell = %id, "dependencies removed");
    }

    /// Cells `id` reads from (empty if none are recorded).
    pub fn upstream_of<Q>(&self, id: &Q) -> &BTreeSet<CellId>
    where
        CellId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.upstream.get(id).unwrap_or(&EMPTY)
    }

    /// Cells that read `id` (empty if none are recorded).
    pub fn downstream_of<Q>(&self, id: &Q) -> &BTreeSet<CellId>
    where
        CellId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.downstream.get(id).unwrap_or(&EMPTY)
    }

    /// True when no links are recorded.
    pub fn is_empty(&self) -> bool {
        self.upstream.is_empty() && self.downstream.is_empty()
    }

    /// Every cell transitively downstream of `id`, excluding `id` itself,
    /// ordered so that each cell comes after all of its upstream cells in
    /// the set.
    pub fn downstream_order(&self, id: &CellId) -> Vec<CellId> {
        let mut reached: HashSet<&CellId> = HashSet::new();
        let mut stack: Vec<&CellId> = self.downstream_of(id).iter().collect();
        while let Some(next) = stack.pop() {
            if reached.insert(next) {
                stack.extend(self.downstream_of(next).iter());
            }
        }

        // Kahn's algorithm restricted to the reached cells.
        let mut pending: HashMap<&CellId, usize> = reached
            .iter()
            .map(|node| {
                let inside = self
                    .upstream_of(*node)
                    .iter()
                    .filter(|up| reached.contains(up))
                    .count();
                (*node, inside)
            })
            .collect();

        let mut ready: VecDeque<&CellId> = self
            .downstream_of(id)
            .iter()
            .filter(|node| pending.get(node) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(reached.len());

        while let Some(node) = ready.pop_front() {
            order.push(node.clone());
            for child in self.downstream_of(node) {
                if let Some(count) = pending.get_mut(child) {
                    *count -= 1;
                    if *count == 0 {
                        ready.push_back(child);
                    }
                }
            }
        }

        order
    }

    /// Whether upstream and downstream are exact inverses and hold no
    /// empty sets.
    pub fn is_consistent(&self) -> bool {
        let forward = self.upstream.iter().all(|(id, ups)| {
            !ups.is_empty()
                && ups
                    .iter()
                    .all(|up| self.downstream_of(up).contains(id))
        });
        let backward = self.downstream.iter().all(|(id, downs)| {
            !downs.is_empty()
                && downs
                    .iter()
                    .all(|down| self.upstream_of(down).contains(id))
        });
        forward && backward
    }

    /// Whether any cycle exists anywhere in the graph.
    pub fn has_cycle(&self) -> bool {
        self.upstream
            .keys()
            .any(|id| detect_cycle(id, &self.upstream).is_some())
    }
}

fn detach(downstream: &mut HashMap<CellId, BTreeSet<CellId>>, from: &CellId, id: &CellId) {
    if let Some(set) = downstream.get_mut(from) {
        set.remove(id);
        if set.is_empty() {
            downstream.remove(from);
        }
    }
}

fn write_links(f: &mut fmt::Formatter<'_>, links: &HashMap<CellId, BTreeSet<CellId>>) -> fmt::Result {
    let mut ids: Vec<&CellId> = links.keys().collect();
    ids.sort();
    for id in ids {
        let set = &links[id];
        if set.is_empty() {
            continue;
        }
        let joined = set
            .iter()
            .map(CellId::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "{:>4} : [{}]", id.as_str(), joined)?;
    }
    Ok(())
}

impl fmt::Display for DepGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Upstream Links:")?;
        write_links(f, &self.upstream)?;
        writeln!(f, "Downstream Links:")?;
        write_links(f, &self.downstream)
    }
}
