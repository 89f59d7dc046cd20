//! Circular dependency detection.
//!
//! When a formula is entered, we must verify it doesn't close a loop
//! (e.g., A1 reads B1, B1 reads C1, C1 reads A1). The search follows
//! upstream links depth-first from the changed cell and reports the first
//! path that leads back to it.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use thiserror::Error;

use super::cell_id::CellId;

/// A rejected edit: the path starts and ends at the repeated cell.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Circular dependency detected: {}", PathDisplay(.path))]
pub struct CycleError {
    pub path: Vec<CellId>,
}

struct PathDisplay<'a>(&'a [CellId]);

impl fmt::Display for PathDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

/// Detect a dependency cycle through `start`.
/// Returns Some(cycle_path) if a cycle is found, None otherwise.
///
/// Only cycles that pass through `start` are reported; the rest of the graph
/// is assumed acyclic, which holds as long as every edit is checked.
pub fn detect_cycle(
    start: &CellId,
    upstream: &HashMap<CellId, BTreeSet<CellId>>,
) -> Option<Vec<CellId>> {
    // Nodes fully explored without reaching `start`.
    let mut cleared: HashSet<CellId> = HashSet::new();
    let mut path: Vec<CellId> = vec![start.clone()];
    let mut frames = vec![neighbors(start, upstream)];

    while let Some(frame) = frames.last_mut() {
        match frame.next() {
            Some(next) if next == start => {
                path.push(next.clone());
                return Some(path);
            }
            Some(next) => {
                if cleared.contains(next) {
                    continue;
                }
                path.push(next.clone());
                frames.push(neighbors(next, upstream));
            }
            None => {
                frames.pop();
                if let Some(done) = path.pop() {
                    cleared.insert(done);
                }
            }
        }
    }

    None
}

fn neighbors<'a>(
    id: &CellId,
    upstream: &'a HashMap<CellId, BTreeSet<CellId>>,
) -> std::collections::btree_set::Iter<'a, CellId> {
    static NONE: BTreeSet<CellId> = BTreeSet::new();
    upstream.get(id).unwrap_or(&NONE).iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build upstream links from `("A1", "B1 C1")` pairs.
    fn links(pairs: &[(&str, &str)]) -> HashMap<CellId, BTreeSet<CellId>> {
        pairs
            .iter()
            .map(|(id, deps)| {
                (
                    CellId::new(id),
                    deps.split_whitespace().map(CellId::new).collect::<BTreeSet<_>>(),
                )
            })
            .collect()
    }

    fn path(ids: &str) -> Vec<CellId> {
        ids.split_whitespace().map(CellId::new).collect()
    }

    #[test]
    fn test_detect_cycle_no_cycle() {
        let upstream = links(&[("C1", "A1 B1"), ("B1", "A1")]);
        assert!(detect_cycle(&CellId::new("C1"), &upstream).is_none());
        assert!(detect_cycle(&CellId::new("B1"), &upstream).is_none());
        assert!(detect_cycle(&CellId::new("Z9"), &upstream).is_none());
    }

    #[test]
    fn test_detect_cycle_self_reference() {
        let upstream = links(&[("A1", "A1")]);
        assert_eq!(
            detect_cycle(&CellId::new("A1"), &upstream),
            Some(path("A1 A1"))
        );
    }

    #[test]
    fn test_detect_cycle_direct() {
        let upstream = links(&[("A1", "B1"), ("B1", "A1")]);
        assert_eq!(
            detect_cycle(&CellId::new("A1"), &upstream),
            Some(path("A1 B1 A1"))
        );
        assert_eq!(
            detect_cycle(&CellId::new("B1"), &upstream),
            Some(path("B1 A1 B1"))
        );
    }

    #[test]
    fn test_detect_cycle_indirect() {
        let upstream = links(&[("A1", "B1"), ("B1", "C1"), ("C1", "A1")]);
        assert_eq!(
            detect_cycle(&CellId::new("C1"), &upstream),
            Some(path("C1 A1 B1 C1"))
        );
    }

    #[test]
    fn test_detect_cycle_explores_every_branch() {
        // The first branch (B1) dead-ends; the cycle closes through D1.
        let upstream = links(&[
            ("A1", "B1 D1"),
            ("B1", "C1"),
            ("D1", "E1"),
            ("E1", "A1"),
        ]);
        assert_eq!(
            detect_cycle(&CellId::new("A1"), &upstream),
            Some(path("A1 D1 E1 A1"))
        );
    }

    #[test]
    fn test_detect_cycle_diamond_is_not_a_cycle() {
        let upstream = links(&[
            ("A1", "B1 C1"),
            ("B1", "D1"),
            ("C1", "D1"),
            ("D1", "E1"),
        ]);
        assert!(detect_cycle(&CellId::new("A1"), &upstream).is_none());
    }

    #[test]
    fn test_cycle_error_message() {
        let err = CycleError {
            path: path("C1 A1 B1 C1"),
        };
        assert_eq!(
            err.to_string(),
            "Circular dependency detected: C1 -> A1 -> B1 -> C1"
        );
    }
}
