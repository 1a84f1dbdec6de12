//! Expression trees and their construction-time validation.

use crate::context::Context;
use crate::error::{EvaluationError, ValidationError, Violation};
use crate::operators::{OperandRule, Operator};
use crate::primitive::Primitive;
use crate::types::{assert_arity, Arity, TypeDescriptor};
use crate::value::{Value, ValueKind};
use chrono::{NaiveDateTime, TimeDelta};
use std::fmt;

/// An immutable node of a typed expression tree.
///
/// Every tree reachable through the public constructors has passed
/// validation, so evaluation only fails on context-dependent conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Value),
    Variable(Variable),
    Operation(Operation),
}

/// A named reference into the evaluation context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    return_type: TypeDescriptor,
    default: Option<Value>,
}

impl Variable {
    pub fn new(name: impl Into<String>, return_type: TypeDescriptor) -> Self {
        Variable {
            name: name.into(),
            return_type,
            default: None,
        }
    }

    /// Sets the value used when no scope binds the variable.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// An operator applied to validated operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    operator: Operator,
    operands: Vec<Expr>,
}

impl Operation {
    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn operands(&self) -> &[Expr] {
        &self.operands
    }
}

impl Expr {
    pub fn null() -> Self {
        Expr::Literal(Value::Null)
    }

    pub fn boolean(b: bool) -> Self {
        Expr::Literal(Value::Boolean(b))
    }

    /// Builds a Number literal from a boolean, integer, float, string or
    /// decimal input.
    pub fn number(raw: impl Into<Primitive>) -> Result<Self, ValidationError> {
        Expr::literal(ValueKind::Number, &raw.into())
    }

    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Value::String(s.into()))
    }

    pub fn timestamp(ts: NaiveDateTime) -> Self {
        Expr::Literal(Value::Timestamp(ts))
    }

    pub fn duration(d: TimeDelta) -> Self {
        Expr::Literal(Value::Duration(d))
    }

    /// Builds a literal of `kind` from a raw primitive.
    pub fn literal(kind: ValueKind, raw: &Primitive) -> Result<Self, ValidationError> {
        raw.to_value(kind)
            .map(Expr::Literal)
            .map_err(|violation| ValidationError::new(kind.literal_name(), vec![violation]))
    }

    pub fn variable(name: impl Into<String>, return_type: TypeDescriptor) -> Self {
        Expr::Variable(Variable::new(name, return_type))
    }

    /// Applies `operator` to `operands`, checking arity and operand kinds.
    ///
    /// All violations are collected before failing.
    pub fn new(operator: Operator, operands: Vec<Expr>) -> Result<Self, ValidationError> {
        let def = operator.definition();
        let mut violations = Vec::new();
        if let Err(violation) = assert_arity(def.arity, operands.len()) {
            violations.push(violation);
        }
        match def.operands {
            OperandRule::Kind(kind) => {
                for (index, operand) in operands.iter().enumerate() {
                    if operand.value_kind() != Some(kind) {
                        violations.push(operand_violation(index, operand, kind.into()));
                    }
                }
            }
            OperandRule::SameKind { ordered } => {
                let expected = operands.first().and_then(Expr::value_kind);
                for (index, operand) in operands.iter().enumerate() {
                    match operand.value_kind() {
                        None => violations.push(Violation::Operand {
                            index,
                            found: operand.return_type().to_string(),
                            expected: "a scalar type".to_string(),
                        }),
                        Some(kind) if ordered && !kind.is_ordered() => {
                            violations.push(Violation::Operand {
                                index,
                                found: operand.return_type().to_string(),
                                expected: "an ordered type".to_string(),
                            })
                        }
                        Some(kind) => {
                            if let Some(expected) = expected.filter(|e| *e != kind) {
                                violations.push(operand_violation(index, operand, expected.into()));
                            }
                        }
                    }
                }
            }
        }
        if !violations.is_empty() {
            return Err(ValidationError::new(def.name, violations));
        }
        Ok(Expr::Operation(Operation { operator, operands }))
    }

    pub fn arity(&self) -> Arity {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => Arity::Nullary,
            Expr::Operation(op) => op.operator.arity(),
        }
    }

    /// The declared type of the value this expression evaluates to.
    pub fn return_type(&self) -> TypeDescriptor {
        match self {
            Expr::Literal(value) => TypeDescriptor::of_kind(value.kind()),
            Expr::Variable(var) => var.return_type.clone(),
            Expr::Operation(op) => TypeDescriptor::of_kind(op.operator.definition().returns),
        }
    }

    /// The runtime kind this expression evaluates to, `None` for
    /// container-typed variables.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            Expr::Literal(value) => Some(value.kind()),
            Expr::Variable(var) => var.return_type.value_kind(),
            Expr::Operation(op) => Some(op.operator.definition().returns),
        }
    }

    pub fn sub_expressions(&self) -> &[Expr] {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => &[],
            Expr::Operation(op) => &op.operands,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }

    pub fn is_terminal(&self) -> bool {
        self.arity() == Arity::Nullary
    }

    /// Name of the concrete variant, e.g. `Number`, `Variable` or `LessThan`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal(value) => value.kind().literal_name(),
            Expr::Variable(_) => "Variable",
            Expr::Operation(op) => op.operator.name(),
        }
    }

    pub fn evaluate(&self, ctx: &Context) -> Result<Value, EvaluationError> {
        crate::evaluate(self, ctx)
    }
}

fn operand_violation(index: usize, operand: &Expr, expected: TypeDescriptor) -> Violation {
    Violation::Operand {
        index,
        found: operand.return_type().to_string(),
        expected: expected.to_string(),
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

impl From<Variable> for Expr {
    fn from(var: Variable) -> Self {
        Expr::Variable(var)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::Null) => f.write_str("Null()"),
            Expr::Literal(Value::String(s)) => write!(f, "String({:?})", s),
            Expr::Literal(value) => write!(f, "{}({})", value.kind().literal_name(), value),
            Expr::Variable(var) => {
                write!(f, "Variable({}: {}", var.name, var.return_type)?;
                if let Some(default) = &var.default {
                    write!(f, " = {}", default)?;
                }
                f.write_str(")")
            }
            Expr::Operation(op) => {
                write!(f, "{}(", op.operator)?;
                for (i, operand) in op.operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", operand)?;
                }
                f.write_str(")")
            }
        }
    }
}
