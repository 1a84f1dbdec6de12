use crate::types::{Arity, TypeDescriptor};
use crate::value::ValueKind;
use thiserror::Error;

/// A single reason why an expression could not be constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("expects {expected}, got {found}")]
    Arity { expected: Arity, found: usize },

    #[error("argument {index} is {found}, expected {expected}")]
    Operand {
        index: usize,
        found: String,
        expected: String,
    },

    #[error("literal value is {found}, expected {expected}")]
    Literal { found: String, expected: ValueKind },

    #[error("{input:?} cannot be converted into a number")]
    Number { input: String },
}

/// Construction-time failure listing every violation at once.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid {expression} expression: {}", join(.violations))]
pub struct ValidationError {
    pub expression: &'static str,
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(expression: &'static str, violations: Vec<Violation>) -> Self {
        ValidationError {
            expression,
            violations,
        }
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error("variable {0:?} not found in context")]
    VariableNotFound(String),

    #[error("no scope left to pop")]
    PopUnderflow,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("variable {name} not found")]
    VariableNotFound {
        name: String,
        #[source]
        source: ContextError,
    },

    #[error("variable {name:?} has incorrect type, expected: {expected}, got: {found}")]
    VariableType {
        name: String,
        expected: TypeDescriptor,
        found: ValueKind,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("operand evaluated to {found}, expected {expected}")]
    OperandKind {
        expected: ValueKind,
        found: ValueKind,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expression mapping must have exactly one key, got {keys:?}")]
    Ambiguous { keys: Vec<String> },

    #[error("no codec registered for {0:?}")]
    UnregisteredTag(String),

    #[error("malformed type descriptor: {0}")]
    MalformedType(String),

    #[error("malformed data: {0}")]
    Malformed(String),

    #[error("cannot be represented: {0}")]
    NotRepresentable(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("json: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        ParseError::Json(err.to_string())
    }
}

/// Any failure raised by this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pop_empty() -> Result<(), Error> {
        Err(ContextError::PopUnderflow)?
    }

    #[test]
    fn umbrella_error_wraps_every_family() {
        assert_eq!(pop_empty(), Err(Error::Context(ContextError::PopUnderflow)));
        assert_eq!(
            Error::from(EvaluationError::DivisionByZero).to_string(),
            "division by zero"
        );
        let arity = Violation::Arity {
            expected: Arity::Binary,
            found: 1,
        };
        let invalid = ValidationError::new("Div", vec![arity]);
        assert_eq!(
            Error::from(ParseError::from(invalid.clone())).to_string(),
            invalid.to_string()
        );
        assert_eq!(
            invalid.to_string(),
            "invalid Div expression: expects two operands, got 1"
        );
    }
}
