//! Typed expression trees with validation, evaluation and serialization.
//!
//! # Overview
//!
//! An [`Expr`] is an immutable tree of literals, variables and operations
//! over a small set of value kinds (null, boolean, arbitrary-precision
//! number, string, timestamp, duration). Trees are checked when they are
//! built, evaluated against a layered [`Context`], and converted to and from
//! structured primitives or JSON text through a tag-keyed [`Registry`].
//!
//! # Example
//!
//! ```
//! use typed_expression::{Context, Expr, JsonParser, Operator, Parser, TypeDescriptor};
//!
//! let expr = Expr::new(
//!     Operator::Add,
//!     vec![Expr::number("1.5").unwrap(), Expr::variable("x", TypeDescriptor::Int)],
//! )
//! .unwrap();
//!
//! let ctx: Context = [("x", 2)].into_iter().collect();
//! assert_eq!(expr.evaluate(&ctx).unwrap().to_string(), "3.5");
//!
//! let parser = JsonParser::default();
//! let text = parser.serialize(&expr).unwrap();
//! assert_eq!(parser.parse(text).unwrap(), expr);
//! ```

pub mod context;
pub mod error;
pub mod evaluate;
pub mod expr;
pub mod json;
pub mod operators;
pub mod parser;
pub mod primitive;
pub mod registry;
pub mod types;
pub mod value;

pub use context::{Context, Scope};
pub use error::{ContextError, Error, EvaluationError, ParseError, ValidationError, Violation};
pub use evaluate::evaluate;
pub use expr::{Expr, Operation, Variable};
pub use json::JsonOptions;
pub use operators::{Operator, OperatorDefinition};
pub use parser::{JsonParser, Parser, PrimitiveParser};
pub use primitive::Primitive;
pub use registry::{registry, Registry};
pub use types::{Arity, TypeDescriptor};
pub use value::{Value, ValueKind};
