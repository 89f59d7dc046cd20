//! Cell identifiers.
//!
//! The graph and the store treat identifiers as opaque keys: any string is a
//! valid [`CellId`] once it reaches them. The A1-style syntax
//! (`^[A-Z]+[1-9][0-9]*$`) is only enforced at the input boundary through
//! [`CellId::parse`] / [`str::parse`].
//!
//! # Examples
//!
//! ```
//! use cellsheet_engine::engine::CellId;
//!
//! let id = CellId::parse("CX5").unwrap();
//! assert_eq!(id.as_str(), "CX5");
//! assert!(CellId::parse("A0").is_none());
//! ```

use regex::Regex;
use std::borrow::Borrow;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// An opaque cell identifier. Clones share the underlying string.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellId(Arc<str>);

/// Returned when text does not follow the identifier syntax.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid cell identifier: {0:?}")]
pub struct InvalidCellId(pub String);

fn id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]+[1-9][0-9]*$").expect("valid identifier regex"))
}

impl CellId {
    /// Wrap `name` without checking its syntax.
    pub fn new(name: impl AsRef<str>) -> CellId {
        CellId(Arc::from(name.as_ref()))
    }

    /// Parse an identifier, returning None unless it is one or more uppercase
    /// letters followed by a number without a leading zero.
    pub fn parse(name: &str) -> Option<CellId> {
        id_re().is_match(name).then(|| CellId::new(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for CellId {
    type Err = InvalidCellId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellId::parse(s).ok_or_else(|| InvalidCellId(s.to_string()))
    }
}

impl From<&str> for CellId {
    fn from(name: &str) -> Self {
        CellId::new(name)
    }
}

impl From<String> for CellId {
    fn from(name: String) -> Self {
        CellId(Arc::from(name))
    }
}

impl From<&CellId> for CellId {
    fn from(id: &CellId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for CellId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CellId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
