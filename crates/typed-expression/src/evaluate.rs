//! The main `evaluate` function.

use crate::context::Context;
use crate::error::EvaluationError;
use crate::expr::{Expr, Variable};
use crate::value::Value;
use tracing::trace;

/// Evaluates an expression tree against a context.
///
/// - Literals return their wrapped value.
/// - Variables resolve through the context, falling back to their default.
/// - Operations dispatch to their operator's evaluation function.
///
/// The first error raised by any sub-expression is returned as is.
pub fn evaluate(expr: &Expr, ctx: &Context) -> Result<Value, EvaluationError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Variable(var) => resolve(var, ctx),
        Expr::Operation(op) => {
            let def = op.operator().definition();
            trace!(operator = def.name, operands = op.operands().len(), "evaluating");
            (def.eval_fn)(op.operands(), ctx)
        }
    }
}

fn resolve(var: &Variable, ctx: &Context) -> Result<Value, EvaluationError> {
    let value = ctx
        .get_or(var.name(), var.default())
        .map_err(|source| EvaluationError::VariableNotFound {
            name: var.name().to_string(),
            source,
        })?;
    if !var.return_type().matches(value) {
        return Err(EvaluationError::VariableType {
            name: var.name().to_string(),
            expected: var.return_type().clone(),
            found: value.kind(),
        });
    }
    trace!(name = var.name(), %value, "resolved variable");
    Ok(value.clone())
}
