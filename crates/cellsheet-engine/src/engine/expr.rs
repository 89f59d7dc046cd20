//! Formula expression trees.

use std::collections::BTreeSet;

use super::cell_id::CellId;

/// Binary arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
        }
    }
}

/// An immutable arithmetic expression over numbers and cell references.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Ref(CellId),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn neg(inner: Expr) -> Expr {
        Expr::Neg(Box::new(inner))
    }

    /// Every distinct identifier referenced anywhere in the tree.
    pub fn references(&self) -> BTreeSet<CellId> {
        let mut refs = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Expr::Number(_) => {}
                Expr::Ref(id) => {
                    refs.insert(id.clone());
                }
                Expr::Neg(inner) => stack.push(inner),
                Expr::Binary { lhs, rhs, .. } => {
                    stack.push(rhs);
                    stack.push(lhs);
                }
            }
        }
        refs
    }
}

// Deep trees would otherwise drop recursively.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        take_children(self, &mut stack);
        while let Some(mut node) = stack.pop() {
            take_children(&mut node, &mut stack);
        }
    }
}

fn take_children(node: &mut Expr, stack: &mut Vec<Expr>) {
    match node {
        Expr::Neg(inner) => stack.push(std::mem::replace(&mut **inner, Expr::Number(0.0))),
        Expr::Binary { lhs, rhs, .. } => {
            stack.push(std::mem::replace(&mut **lhs, Expr::Number(0.0)));
            stack.push(std::mem::replace(&mut **rhs, Expr::Number(0.0)));
        }
        Expr::Number(_) | Expr::Ref(_) => {}
    }
}
