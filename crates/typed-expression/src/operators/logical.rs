//! Logical operators.

use super::{boolean, OperandRule, OperatorDefinition};
use crate::context::Context;
use crate::error::EvaluationError;
use crate::expr::Expr;
use crate::types::Arity;
use crate::value::{Value, ValueKind};

fn and_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    for e in operands {
        if !boolean(e, ctx)? {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

fn or_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    for e in operands {
        if boolean(e, ctx)? {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

fn not_eval(operands: &[Expr], ctx: &Context) -> Result<Value, EvaluationError> {
    Ok(Value::Boolean(!boolean(&operands[0], ctx)?))
}

const BOOLEAN: OperandRule = OperandRule::Kind(ValueKind::Boolean);

pub static AND: OperatorDefinition = OperatorDefinition {
    name: "And",
    tag: "and",
    arity: Arity::NAry,
    operands: BOOLEAN,
    returns: ValueKind::Boolean,
    eval_fn: and_eval,
};

pub static OR: OperatorDefinition = OperatorDefinition {
    name: "Or",
    tag: "or",
    arity: Arity::NAry,
    operands: BOOLEAN,
    returns: ValueKind::Boolean,
    eval_fn: or_eval,
};

pub static NOT: OperatorDefinition = OperatorDefinition {
    name: "Not",
    tag: "not",
    arity: Arity::Unary,
    operands: BOOLEAN,
    returns: ValueKind::Boolean,
    eval_fn: not_eval,
};
