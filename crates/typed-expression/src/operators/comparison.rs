//! Comparison operators.

use super::{OperandRule, OperatorDefinition};
use crate::context::Context;
use crate::error::EvaluationError;
use crate::expr::Expr;
use crate::types::Arity;
use crate::value::{Value, ValueKind};
use std::cmp::Ordering;

/// Evaluates both operands and tests their ordering with `accept`.
///
/// Construction guarantees both operands share a kind, so the total order
/// on [`Value`] reduces to that kind's natural order.
fn compare(
    operands: &[Expr],
    ctx: &Context,
    accept: fn(Ordering) -> bool,
) -> Result<Value, EvaluationError> {
    let left = crate::evaluate(&operands[0], ctx)?;
    let right = crate::evaluate(&operands[1], ctx)?;
    Ok(Value::Boolean(accept(left.cmp(&right))))
}

fn equal_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    compare(operands, ctx, Ordering::is_eq)
}

fn not_equal_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    compare(operands, ctx, Ordering::is_ne)
}

fn less_than_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    compare(operands, ctx, Ordering::is_lt)
}

fn less_than_or_equal_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    compare(operands, ctx, Ordering::is_le)
}

fn greater_than_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    compare(operands, ctx, Ordering::is_gt)
}

fn greater_than_or_equal_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    compare(operands, ctx, Ordering::is_ge)
}

pub static EQUAL: OperatorDefinition = OperatorDefinition {
    name: "Equal",
    tag: "equal",
    arity: Arity::Binary,
    operands: OperandRule::SameKind { ordered: false },
    returns: ValueKind::Boolean,
    eval_fn: equal_eval,
};

pub static NOT_EQUAL: OperatorDefinition = OperatorDefinition {
    name: "NotEqual",
    tag: "not-equal",
    arity: Arity::Binary,
    operands: OperandRule::SameKind { ordered: false },
    returns: ValueKind::Boolean,
    eval_fn: not_equal_eval,
};

pub static LESS_THAN: OperatorDefinition = OperatorDefinition {
    name: "LessThan",
    tag: "less-than",
    arity: Arity::Binary,
    operands: OperandRule::SameKind { ordered: true },
    returns: ValueKind::Boolean,
    eval_fn: less_than_eval,
};

pub static LESS_THAN_OR_EQUAL: OperatorDefinition = OperatorDefinition {
    name: "LessThanOrEqual",
    tag: "less-than-or-equal",
    arity: Arity::Binary,
    operands: OperandRule::SameKind { ordered: true },
    returns: ValueKind::Boolean,
    eval_fn: less_than_or_equal_eval,
};

pub static GREATER_THAN: OperatorDefinition = OperatorDefinition {
    name: "GreaterThan",
    tag: "greater-than",
    arity: Arity::Binary,
    operands: OperandRule::SameKind { ordered: true },
    returns: ValueKind::Boolean,
    eval_fn: greater_than_eval,
};

pub static GREATER_THAN_OR_EQUAL: OperatorDefinition = OperatorDefinition {
    name: "GreaterThanOrEqual",
    tag: "greater-than-or-equal",
    arity: Arity::Binary,
    operands: OperandRule::SameKind { ordered: true },
    returns: ValueKind::Boolean,
    eval_fn: greater_than_or_equal_eval,
};
