//! Cell data structures.
//!
//! - [`CellType`] - What a cell holds: a number, text, or a parsed formula
//!   together with its last computed value
//! - [`Cell`] - The raw (trimmed) input alongside its [`CellType`]
//! - [`CellKind`] - A plain tag for matching on the kind of a cell
//!
//! A formula cell with no cached value is in the error state. Freshly built
//! formula cells start there and only leave it through [`Cell::recompute`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::cell_id::CellId;
use super::eval::{ValueLookup, evaluate};
use super::expr::Expr;
use super::format::format_value;
use super::parse::{FORMULA_PREFIX, ParseError, parse_formula};

/// The type of content stored in a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum CellType {
    Number(f64),
    Text,
    Formula { expr: Expr, value: Option<f64> },
}

/// Kind tag of a cell, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Number,
    Text,
    Formula,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellKind::Number => "number",
            CellKind::Text => "string",
            CellKind::Formula => "formula",
        })
    }
}

/// A cell in the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    contents: String,
    contents_type: CellType,
}

impl Cell {
    pub fn new_text(text: &str) -> Cell {
        Cell {
            contents: text.to_string(),
            contents_type: CellType::Text,
        }
    }

    /// Create a formula cell from text beginning with `=`.
    /// The cell is in the error state until recomputed.
    pub fn new_formula(formula: &str) -> Result<Cell, ParseError> {
        let formula = formula.trim();
        let expr = parse_formula(formula)?;
        Ok(Cell {
            contents: formula.to_string(),
            contents_type: CellType::Formula { expr, value: None },
        })
    }

    /// Classify user input:
    /// - A numeric literal (see [`parse_number`]) -> Number
    /// - Starts with '=' -> Formula (parse errors are returned)
    /// - Otherwise -> Text
    ///
    /// Input is trimmed first, and the trimmed text is kept as the contents.
    pub fn from_input(input: &str) -> Result<Cell, ParseError> {
        let trimmed = input.trim();

        if let Some(n) = parse_number(trimmed) {
            return Ok(Cell {
                contents: trimmed.to_string(),
                contents_type: CellType::Number(n),
            });
        }

        if trimmed.starts_with(FORMULA_PREFIX) {
            return Cell::new_formula(trimmed);
        }

        Ok(Cell::new_text(trimmed))
    }

    /// The trimmed text the cell was built from.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn kind(&self) -> CellKind {
        match self.contents_type {
            CellType::Number(_) => CellKind::Number,
            CellType::Text => CellKind::Text,
            CellType::Formula { .. } => CellKind::Formula,
        }
    }

    /// Numeric value: the number itself, or a formula's cached result.
    pub fn value(&self) -> Option<f64> {
        match &self.contents_type {
            CellType::Number(n) => Some(*n),
            CellType::Text => None,
            CellType::Formula { value, .. } => *value,
        }
    }

    /// The parsed expression of a formula cell.
    pub fn formula(&self) -> Option<&Expr> {
        match &self.contents_type {
            CellType::Formula { expr, .. } => Some(expr),
            _ => None,
        }
    }

    /// True only for formula cells without a cached value.
    pub fn is_error(&self) -> bool {
        matches!(self.contents_type, CellType::Formula { value: None, .. })
    }

    /// Re-evaluate a formula against `lookup`, caching the result or
    /// entering the error state. Number and text cells are untouched.
    /// Returns whether the cached value changed.
    pub fn recompute(&mut self, lookup: &impl ValueLookup) -> bool {
        let CellType::Formula { expr, value } = &mut self.contents_type else {
            return false;
        };
        let next = evaluate(expr, lookup).ok();
        let changed = !same_value(*value, next);
        *value = next;
        changed
    }

    /// Text shown for the cell: one decimal digit for numbers and formula
    /// results, `ERROR` for formulas in error, the raw text otherwise.
    pub fn display_text(&self) -> String {
        match &self.contents_type {
            CellType::Text => self.contents.clone(),
            CellType::Number(n) => format_value(Some(*n)),
            CellType::Formula { value, .. } => format_value(*value),
        }
    }

    /// Distinct identifiers referenced by a formula; empty for other kinds.
    pub fn referenced_ids(&self) -> BTreeSet<CellId> {
        self.formula().map(Expr::references).unwrap_or_default()
    }
}

/// Parse a numeric literal: an optional sign, digits with an optional
/// fraction, and an optional exponent (`42`, `-5.23`, `.5`, `1e3`), or one of
/// the exact spellings `Infinity` and `NaN`.
///
/// Words like `inf` or `nan` are not numbers here, unlike [`f64::from_str`].
pub fn parse_number(text: &str) -> Option<f64> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" || unsigned == "NaN" {
        return text.replace("Infinity", "inf").parse().ok();
    }
    let literal = unsigned.bytes().any(|b| b.is_ascii_digit())
        && unsigned
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !literal {
        return None;
    }
    text.parse().ok()
}

fn same_value(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x.to_bits() == y.to_bits(),
        (None, None) => true,
        _ => false,
    }
}

impl ValueLookup for HashMap<CellId, Cell> {
    fn value_of(&self, id: &CellId) -> Option<f64> {
        self.get(id).and_then(Cell::value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_map(pairs: &[(&str, &str)]) -> HashMap<CellId, Cell> {
        pairs
            .iter()
            .map(|(id, text)| (CellId::new(id), Cell::from_input(text).unwrap()))
            .collect()
    }

    fn assert_stable(cell: &mut Cell, kind: CellKind, display: &str, contents: &str, value: Option<f64>) {
        for _ in 0..2 {
            assert_eq!(cell.kind(), kind);
            assert_eq!(cell.display_text(), display);
            assert_eq!(cell.contents(), contents);
            assert_eq!(cell.value(), value);
            assert!(!cell.is_error());
            cell.recompute(&cell_map(&[]));
        }
    }

    #[test]
    fn test_string_cells() {
        let mut cell = Cell::from_input("hello").unwrap();
        assert_stable(&mut cell, CellKind::Text, "hello", "hello", None);

        let mut cell = Cell::from_input("-hi").unwrap();
        assert_stable(&mut cell, CellKind::Text, "-hi", "-hi", None);

        let mut cell = Cell::from_input("A5+B2").unwrap();
        assert_stable(&mut cell, CellKind::Text, "A5+B2", "A5+B2", None);
    }

    #[test]
    fn test_string_cells_trimmed() {
        let mut cell = Cell::from_input(" Hello").unwrap();
        assert_stable(&mut cell, CellKind::Text, "Hello", "Hello", None);

        let mut cell = Cell::from_input("  a  b c  ").unwrap();
        assert_stable(&mut cell, CellKind::Text, "a  b c", "a  b c", None);
    }

    #[test]
    fn test_float_words_are_text() {
        for text in ["nan", "inf", "infinity", "-INF", "Inf", "+nan", "e5", "."] {
            let cell = Cell::from_input(text).unwrap();
            assert_eq!(cell.kind(), CellKind::Text, "{} should be text", text);
            assert_eq!(cell.value(), None);
            assert_eq!(cell.display_text(), text);
        }
    }

    #[test]
    fn test_special_number_spellings() {
        let cell = Cell::from_input("Infinity").unwrap();
        assert_eq!(cell.kind(), CellKind::Number);
        assert_eq!(cell.value(), Some(f64::INFINITY));
        assert_eq!(cell.display_text(), "Infinity");

        let cell = Cell::from_input("-Infinity").unwrap();
        assert_eq!(cell.value(), Some(f64::NEG_INFINITY));
        assert_eq!(cell.display_text(), "-Infinity");

        let cell = Cell::from_input("NaN").unwrap();
        assert_eq!(cell.kind(), CellKind::Number);
        assert!(cell.value().is_some_and(f64::is_nan));
        assert_eq!(cell.display_text(), "NaN");
    }

    #[test]
    fn test_parse_number_literals() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("+4.5"), Some(4.5));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("-2.5E-1"), Some(-0.25));
        assert_eq!(parse_number("1-2"), None);
        assert_eq!(parse_number("1e"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("infinity"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_number_cells() {
        let mut cell = Cell::from_input("1").unwrap();
        assert_stable(&mut cell, CellKind::Number, "1.0", "1", Some(1.0));

        let mut cell = Cell::from_input("10.472").unwrap();
        assert_stable(&mut cell, CellKind::Number, "10.5", "10.472", Some(10.472));

        let mut cell = Cell::from_input("-5.23").unwrap();
        assert_stable(&mut cell, CellKind::Number, "-5.2", "-5.23", Some(-5.23));

        let mut cell = Cell::from_input("   10.472     ").unwrap();
        assert_stable(&mut cell, CellKind::Number, "10.5", "10.472", Some(10.472));
    }

    #[test]
    fn test_formula_error_after_creation() {
        let cell = Cell::from_input("=A5").unwrap();
        assert_eq!(cell.kind(), CellKind::Formula);
        assert_eq!(cell.display_text(), "ERROR");
        assert_eq!(cell.contents(), "=A5");
        assert_eq!(cell.value(), None);
        assert!(cell.is_error());

        // Even constant formulas wait for an explicit recompute.
        let cell = Cell::from_input("=  8   ").unwrap();
        assert_eq!(cell.contents(), "=  8");
        assert!(cell.is_error());
    }

    #[test]
    fn test_formula_recompute() {
        let mut cell = Cell::from_input("=5.89").unwrap();
        assert!(cell.recompute(&cell_map(&[])));
        assert_eq!(cell.display_text(), "5.9");
        assert_eq!(cell.value(), Some(5.89));
        assert!(!cell.is_error());

        let mut cell = Cell::from_input("=(100 + A2) - 10 / (CX5 * BB8)").unwrap();
        let cells = cell_map(&[("BB8", "-0.5"), ("A2", "200.0"), ("CX5", "10")]);
        cell.recompute(&cells);
        assert_eq!(cell.display_text(), "302.0");
    }

    #[test]
    fn test_formula_recompute_idempotent() {
        let mut cell = Cell::from_input("=A1 * 2").unwrap();
        let cells = cell_map(&[("A1", "4")]);
        assert!(cell.recompute(&cells));
        assert!(!cell.recompute(&cells));
        assert_eq!(cell.value(), Some(8.0));

        let empty = cell_map(&[]);
        assert!(cell.recompute(&empty));
        assert!(!cell.recompute(&empty));
        assert!(cell.is_error());
    }

    #[test]
    fn test_formula_references_text_cell() {
        let mut cell = Cell::from_input("=A1 + 1").unwrap();
        cell.recompute(&cell_map(&[("A1", "hello")]));
        assert!(cell.is_error());
    }

    #[test]
    fn test_formula_references_error_cell() {
        let mut cell = Cell::from_input("=A1 + 1").unwrap();
        cell.recompute(&cell_map(&[("A1", "=B1")]));
        assert!(cell.is_error());
    }

    #[test]
    fn test_formula_syntax_error() {
        assert!(Cell::from_input("=1 +").is_err());
        assert!(Cell::from_input("=(A1").is_err());
    }

    #[test]
    fn test_referenced_ids() {
        let ids = |text: &str| -> Vec<String> {
            Cell::from_input(text)
                .unwrap()
                .referenced_ids()
                .iter()
                .map(|id| id.to_string())
                .collect()
        };

        assert!(ids("= -( 5 + 8 / 4 * (7+1) - 1) + 5").is_empty());
        assert_eq!(ids("=A1"), vec!["A1"]);
        assert_eq!(ids("=2 * 20 + CX5"), vec!["CX5"]);
        assert_eq!(ids("=-BB8"), vec!["BB8"]);
        assert_eq!(ids("=(100 + A2) - 10 / (CX5 * BB8)"), vec!["A2", "BB8", "CX5"]);
        assert_eq!(ids("=A1*A1"), vec!["A1"]);
        assert_eq!(
            ids("=(100 + A2 - (B7*(1+6)) - 10) / (CX5 * BB8 / Z8) + 22 - 0.5*GG67*GG67/BB8+Z2"),
            vec!["A2", "B7", "BB8", "CX5", "GG67", "Z2", "Z8"]
        );
        assert!(ids("42").is_empty());
        assert!(ids("hello").is_empty());
    }
}
