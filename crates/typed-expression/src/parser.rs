//! Parsers converting expressions to and from external representations.

use crate::error::ParseError;
use crate::expr::Expr;
use crate::json::{self, JsonOptions};
use crate::primitive::Primitive;
use crate::registry::{registry, Registry};

/// A two-way conversion between expressions and some representation.
pub trait Parser {
    type Repr;

    fn serialize(&self, expr: &Expr) -> Result<Self::Repr, ParseError>;

    fn parse(&self, repr: Self::Repr) -> Result<Expr, ParseError>;
}

/// Converts expressions to and from structured primitives.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveParser<'r> {
    registry: &'r Registry,
}

impl<'r> PrimitiveParser<'r> {
    pub fn with_registry(registry: &'r Registry) -> Self {
        PrimitiveParser { registry }
    }
}

impl Default for PrimitiveParser<'static> {
    fn default() -> Self {
        PrimitiveParser::with_registry(registry())
    }
}

impl Parser for PrimitiveParser<'_> {
    type Repr = Primitive;

    #[tracing::instrument(skip_all, fields(expr = expr.kind_name()))]
    fn serialize(&self, expr: &Expr) -> Result<Primitive, ParseError> {
        self.registry.serialize(expr)
    }

    #[tracing::instrument(skip_all)]
    fn parse(&self, repr: Primitive) -> Result<Expr, ParseError> {
        self.registry.deserialize(&repr)
    }
}

/// Converts expressions to and from JSON text.
#[derive(Debug, Clone, Copy)]
pub struct JsonParser<'r> {
    registry: &'r Registry,
    options: JsonOptions,
}

impl<'r> JsonParser<'r> {
    pub fn with_registry(registry: &'r Registry) -> Self {
        JsonParser {
            registry,
            options: JsonOptions::default(),
        }
    }

    pub fn with_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }

    /// Parses JSON text without taking ownership of it.
    pub fn parse_str(&self, text: &str) -> Result<Expr, ParseError> {
        let data = json::from_str(text)?;
        PrimitiveParser::with_registry(self.registry).parse(data)
    }
}

impl Default for JsonParser<'static> {
    fn default() -> Self {
        JsonParser::with_registry(registry())
    }
}

impl Parser for JsonParser<'_> {
    type Repr = String;

    #[tracing::instrument(skip_all, fields(expr = expr.kind_name(), pretty = self.options.pretty))]
    fn serialize(&self, expr: &Expr) -> Result<String, ParseError> {
        let data = PrimitiveParser::with_registry(self.registry).serialize(expr)?;
        json::to_string(&data, &self.options)
    }

    #[tracing::instrument(skip_all, fields(len = repr.len()))]
    fn parse(&self, repr: String) -> Result<Expr, ParseError> {
        self.parse_str(&repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Operator;
    use crate::types::TypeDescriptor;

    #[test]
    fn json_parser_writes_tagged_operations() {
        let expr = Expr::new(
            Operator::Add,
            vec![Expr::number(1).unwrap(), Expr::variable("x", TypeDescriptor::Int)],
        )
        .unwrap();
        let text = JsonParser::default().serialize(&expr).unwrap();
        let expected = concat!(
            r#"{"add":[1,{"var":{"name":"x","return_type":"#,
            r#"{"__class__":"type","__value__":"int"}}}]}"#,
        );
        assert_eq!(text, expected);
        assert_eq!(JsonParser::default().parse(text).unwrap(), expr);
    }

    #[test]
    fn custom_registry_is_used() {
        let empty = Registry::empty();
        let parser = PrimitiveParser::with_registry(&empty);
        assert_eq!(
            parser.parse(Primitive::Null),
            Err(ParseError::UnregisteredTag("null".to_string()))
        );
        assert_eq!(PrimitiveParser::default().parse(Primitive::Null), Ok(Expr::null()));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            JsonParser::default().parse_str("{\"add\": ["),
            Err(ParseError::Json(_))
        ));
    }
}
