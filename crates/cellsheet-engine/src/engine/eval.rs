//! Expression evaluation.
//!
//! Walks an [`Expr`] in post-order with an explicit stack, so arbitrarily
//! long operator chains never grow the native call stack. Reference leaves
//! resolve through a [`ValueLookup`]; the first unresolved reference aborts
//! the whole evaluation. Division by zero is not an error: it yields
//! whatever IEEE arithmetic yields.

use std::collections::HashMap;
use thiserror::Error;

use super::cell_id::CellId;
use super::expr::{BinaryOp, Expr};

/// Source of current numeric values for referenced cells.
pub trait ValueLookup {
    /// The cell's value, or None if it is absent, textual, or in error.
    fn value_of(&self, id: &CellId) -> Option<f64>;
}

impl ValueLookup for HashMap<CellId, f64> {
    fn value_of(&self, id: &CellId) -> Option<f64> {
        self.get(id).copied()
    }
}

impl<F> ValueLookup for F
where
    F: Fn(&CellId) -> Option<f64>,
{
    fn value_of(&self, id: &CellId) -> Option<f64> {
        self(id)
    }
}

/// Why an evaluation produced no value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("{0} has no numeric value")]
    MissingValue(CellId),
}

enum Step<'a> {
    Visit(&'a Expr),
    Negate,
    Combine(BinaryOp),
}

/// Evaluate `expr` against `lookup`.
pub fn evaluate(expr: &Expr, lookup: &impl ValueLookup) -> Result<f64, EvalError> {
    let mut steps = vec![Step::Visit(expr)];
    let mut values: Vec<f64> = Vec::new();

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(Expr::Number(n)) => values.push(*n),
            Step::Visit(Expr::Ref(id)) => {
                let value = lookup
                    .value_of(id)
                    .ok_or_else(|| EvalError::MissingValue(id.clone()))?;
                values.push(value);
            }
            Step::Visit(Expr::Neg(inner)) => {
                steps.push(Step::Negate);
                steps.push(Step::Visit(inner));
            }
            Step::Visit(Expr::Binary { op, lhs, rhs }) => {
                steps.push(Step::Combine(*op));
                steps.push(Step::Visit(rhs));
                steps.push(Step::Visit(lhs));
            }
            Step::Negate => {
                if let Some(v) = values.last_mut() {
                    *v = -*v;
                }
            }
            Step::Combine(op) => {
                let rhs = values.pop();
                let lhs = values.pop();
                if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
                    values.push(op.apply(lhs, rhs));
                }
            }
        }
    }

    // Every visit pushes exactly one value, so exactly one remains.
    Ok(values.pop().unwrap_or(f64::NAN))
}
