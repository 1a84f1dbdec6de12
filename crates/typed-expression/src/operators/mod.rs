//! Operator definitions for the non-terminal expression variants.

pub mod arithmetic;
pub mod comparison;
pub mod logical;

use crate::context::Context;
use crate::error::EvaluationError;
use crate::expr::Expr;
use crate::types::Arity;
use crate::value::{Value, ValueKind};
use bigdecimal::BigDecimal;
use std::fmt;

/// The type of an operator evaluation function.
///
/// Receives the operator's operands, already validated against its
/// definition.
pub type EvalFn = fn(&[Expr], &Context) -> Result<Value, EvaluationError>;

/// What an operator requires of its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandRule {
    /// Every operand must evaluate to this kind.
    Kind(ValueKind),
    /// Every operand must evaluate to the kind of the first one. `ordered`
    /// additionally excludes kinds without an order.
    SameKind { ordered: bool },
}

/// Static contract of an operator.
pub struct OperatorDefinition {
    /// Name of the expression variant, e.g. `LessThan`.
    pub name: &'static str,
    /// Canonical serialization tag, e.g. `less-than`.
    pub tag: &'static str,
    pub arity: Arity,
    pub operands: OperandRule,
    pub returns: ValueKind,
    pub eval_fn: EvalFn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Not,
    And,
    Or,
}

impl Operator {
    pub const ALL: [Operator; 14] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Equal,
        Operator::NotEqual,
        Operator::LessThan,
        Operator::LessThanOrEqual,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqual,
        Operator::Not,
        Operator::And,
        Operator::Or,
    ];

    pub fn definition(self) -> &'static OperatorDefinition {
        match self {
            Operator::Add => &arithmetic::ADD,
            Operator::Sub => &arithmetic::SUB,
            Operator::Mul => &arithmetic::MUL,
            Operator::Div => &arithmetic::DIV,
            Operator::Mod => &arithmetic::MOD,
            Operator::Equal => &comparison::EQUAL,
            Operator::NotEqual => &comparison::NOT_EQUAL,
            Operator::LessThan => &comparison::LESS_THAN,
            Operator::LessThanOrEqual => &comparison::LESS_THAN_OR_EQUAL,
            Operator::GreaterThan => &comparison::GREATER_THAN,
            Operator::GreaterThanOrEqual => &comparison::GREATER_THAN_OR_EQUAL,
            Operator::Not => &logical::NOT,
            Operator::And => &logical::AND,
            Operator::Or => &logical::OR,
        }
    }

    pub fn name(self) -> &'static str {
        self.definition().name
    }

    pub fn tag(self) -> &'static str {
        self.definition().tag
    }

    pub fn arity(self) -> Arity {
        self.definition().arity
    }

    pub fn from_tag(tag: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.tag() == tag)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Evaluates an operand that must produce a number.
pub(crate) fn number(expr: &Expr, ctx: &Context) -> Result<BigDecimal, EvaluationError> {
    match crate::evaluate(expr, ctx)? {
        Value::Number(n) => Ok(n),
        other => Err(EvaluationError::OperandKind {
            expected: ValueKind::Number,
            found: other.kind(),
        }),
    }
}

/// Evaluates an operand that must produce a boolean.
pub(crate) fn boolean(expr: &Expr, ctx: &Context) -> Result<bool, EvaluationError> {
    let value = crate::evaluate(expr, ctx)?;
    value.as_bool().ok_or(EvaluationError::OperandKind {
        expected: ValueKind::Boolean,
        found: value.kind(),
    })
}
