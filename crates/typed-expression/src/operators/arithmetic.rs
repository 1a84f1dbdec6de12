//! Arithmetic operators.

use super::{number, OperandRule, OperatorDefinition};
use crate::context::Context;
use crate::error::EvaluationError;
use crate::expr::Expr;
use crate::types::Arity;
use crate::value::{Value, ValueKind};
use bigdecimal::BigDecimal;

fn binary(operands: &[Expr], ctx: &Context) -> Result<(BigDecimal, BigDecimal), EvaluationError> {
    let left = number(&operands[0], ctx)?;
    let right = number(&operands[1], ctx)?;
    Ok((left, right))
}

fn non_zero(divisor: BigDecimal) -> Result<BigDecimal, EvaluationError> {
    if divisor == BigDecimal::from(0) {
        Err(EvaluationError::DivisionByZero)
    } else {
        Ok(divisor)
    }
}

fn add_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    operands
        .iter()
        .try_fold(BigDecimal::from(0), |acc, e| number(e, ctx).map(|n| acc + n))
        .map(Value::Number)
}

fn sub_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    let (left, right) = binary(operands, ctx)?;
    Ok(Value::Number(left - right))
}

fn mul_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    operands
        .iter()
        .try_fold(BigDecimal::from(1), |acc, e| number(e, ctx).map(|n| acc * n))
        .map(Value::Number)
}

fn div_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    let (left, right) = binary(operands, ctx)?;
    Ok(Value::Number(left / non_zero(right)?))
}

// Truncated remainder: the result takes the sign of the dividend.
fn mod_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    let (left, right) = binary(operands, ctx)?;
    Ok(Value::Number(left % non_zero(right)?))
}

const NUMERIC: OperandRule = OperandRule::Kind(ValueKind::Number);

pub static ADD: OperatorDefinition = OperatorDefinition {
    name: "Add",
    tag: "add",
    arity: Arity::AtLeastTwo,
    operands: NUMERIC,
    returns: ValueKind::Number,
    eval_fn: add_eval,
};

pub static SUB: OperatorDefinition = OperatorDefinition {
    name: "Sub",
    tag: "sub",
    arity: Arity::Binary,
    operands: NUMERIC,
    returns: ValueKind::Number,
    eval_fn: sub_eval,
};

pub static MUL: OperatorDefinition = OperatorDefinition {
    name: "Mul",
    tag: "mul",
    arity: Arity::AtLeastTwo,
    operands: NUMERIC,
    returns: ValueKind::Number,
    eval_fn: mul_eval,
};

pub static DIV: OperatorDefinition = OperatorDefinition {
    name: "Div",
    tag: "div",
    arity: Arity::Binary,
    operands: NUMERIC,
    returns: ValueKind::Number,
    eval_fn: div_eval,
};

pub static MOD: OperatorDefinition = OperatorDefinition {
    name: "Mod",
    tag: "mod",
    arity: Arity::Binary,
    operands: NUMERIC,
    returns: ValueKind::Number,
    eval_fn: mod_eval,
};
