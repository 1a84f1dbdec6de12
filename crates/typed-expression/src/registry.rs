//! Tag-keyed dispatch between expressions and structured primitives.

use crate::error::ParseError;
use crate::expr::{Expr, Variable};
use crate::operators::Operator;
use crate::primitive::Primitive;
use crate::value::ValueKind;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Tag of the variable mapping.
pub const VARIABLE_TAG: &str = "var";

pub type Serializer = Arc<dyn Fn(&Expr, &Registry) -> Result<Primitive, ParseError> + Send + Sync>;
pub type Deserializer =
    Arc<dyn Fn(&Primitive, &Registry) -> Result<Expr, ParseError> + Send + Sync>;

/// Two independent dispatch tables: expression variant name → serializer and
/// primitive tag → deserializer.
///
/// Codecs receive the registry so that they can recurse into children.
#[derive(Clone, Default)]
pub struct Registry {
    serializers: HashMap<String, Serializer>,
    deserializers: HashMap<String, Deserializer>,
}

/// The process-wide registry holding every built-in variant.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::standard)
}

impl Registry {
    /// A registry with no codecs.
    pub fn empty() -> Self {
        Registry::default()
    }

    /// A registry with codecs for every built-in expression variant.
    pub fn standard() -> Self {
        let mut registry = Registry::empty();
        registry.register_literal(ValueKind::Null, &["null"]);
        registry.register_literal(ValueKind::Boolean, &["bool"]);
        registry.register_literal(ValueKind::Number, &["int", "float", "decimal"]);
        registry.register_literal(ValueKind::String, &["str"]);
        registry.register_literal(ValueKind::Timestamp, &["datetime"]);
        registry.register_literal(ValueKind::Duration, &["timedelta"]);
        for op in Operator::ALL {
            registry.register_operation(op);
        }
        registry.register_variable();
        registry
    }

    /// Registers `serializer` under an expression variant name. Returns the
    /// serializer it replaces, if any.
    pub fn register_serializer(
        &mut self,
        name: impl Into<String>,
        serializer: Serializer,
    ) -> Option<Serializer> {
        self.serializers.insert(name.into(), serializer)
    }

    /// Registers `deserializer` under a primitive tag. Returns the
    /// deserializer it replaces, if any.
    pub fn register_deserializer(
        &mut self,
        tag: impl Into<String>,
        deserializer: Deserializer,
    ) -> Option<Deserializer> {
        self.deserializers.insert(tag.into(), deserializer)
    }

    pub fn serialize(&self, expr: &Expr) -> Result<Primitive, ParseError> {
        let name = expr.kind_name();
        let serializer = self.serializers.get(name).ok_or_else(|| {
            debug!(name, "no serializer registered");
            ParseError::UnregisteredTag(name.to_string())
        })?;
        serializer(expr, self)
    }

    pub fn deserialize(&self, data: &Primitive) -> Result<Expr, ParseError> {
        let tag = Registry::dispatch_tag(data)?;
        let deserializer = self.deserializers.get(tag).ok_or_else(|| {
            debug!(tag, "no deserializer registered");
            ParseError::UnregisteredTag(tag.to_string())
        })?;
        deserializer(data, self)
    }

    /// Selects the deserializer key for `data`: the only key of a mapping,
    /// otherwise the primitive's kind name.
    pub fn dispatch_tag(data: &Primitive) -> Result<&str, ParseError> {
        match data {
            Primitive::Map(_) => data.single_entry().map(|(tag, _)| tag),
            other => Ok(other.kind_name()),
        }
    }

    fn register_literal(&mut self, kind: ValueKind, tags: &[&str]) {
        self.register_serializer(
            kind.literal_name(),
            Arc::new(|expr: &Expr, _: &Registry| match expr {
                Expr::Literal(value) => Ok(Primitive::from(value.clone())),
                other => Err(unexpected("a literal", other)),
            }),
        );
        for tag in tags {
            self.register_deserializer(
                *tag,
                Arc::new(move |data: &Primitive, _: &Registry| {
                    Expr::literal(kind, data).map_err(ParseError::from)
                }),
            );
        }
    }

    fn register_operation(&mut self, operator: Operator) {
        self.register_serializer(
            operator.name(),
            Arc::new(move |expr: &Expr, registry: &Registry| -> Result<Primitive, ParseError> {
                let Expr::Operation(op) = expr else {
                    return Err(unexpected(operator.name(), expr));
                };
                let operands = op
                    .operands()
                    .iter()
                    .map(|operand| registry.serialize(operand))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Primitive::single(operator.tag(), Primitive::List(operands)))
            }),
        );
        self.register_deserializer(
            operator.tag(),
            Arc::new(move |data: &Primitive, registry: &Registry| -> Result<Expr, ParseError> {
                let (_, body) = data.single_entry()?;
                let Primitive::List(items) = body else {
                    return Err(ParseError::Malformed(format!(
                        "{:?} expects a list of operands, got {}",
                        operator.tag(),
                        body.kind_name()
                    )));
                };
                let operands = items
                    .iter()
                    .map(|item| registry.deserialize(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::new(operator, operands)?)
            }),
        );
    }

    fn register_variable(&mut self) {
        self.register_serializer(
            "Variable",
            Arc::new(|expr: &Expr, _: &Registry| match expr {
                Expr::Variable(var) => {
                    let mut fields = IndexMap::new();
                    fields.insert("name".to_string(), Primitive::Str(var.name().to_string()));
                    fields.insert(
                        "return_type".to_string(),
                        Primitive::Type(var.return_type().clone()),
                    );
                    if let Some(default) = var.default() {
                        fields.insert("default".to_string(), Primitive::from(default.clone()));
                    }
                    Ok(Primitive::single(VARIABLE_TAG, Primitive::Map(fields)))
                }
                other => Err(unexpected("a variable", other)),
            }),
        );
        self.register_deserializer(
            VARIABLE_TAG,
            Arc::new(|data: &Primitive, _: &Registry| deserialize_variable(data)),
        );
    }
}

fn deserialize_variable(data: &Primitive) -> Result<Expr, ParseError> {
    let (_, body) = data.single_entry()?;
    let Primitive::Map(fields) = body else {
        return Err(ParseError::Malformed(format!(
            "variable expects a mapping, got {}",
            body.kind_name()
        )));
    };
    if let Some(key) = fields
        .keys()
        .find(|key| !matches!(key.as_str(), "name" | "return_type" | "default"))
    {
        return Err(ParseError::Malformed(format!("unexpected variable key {:?}", key)));
    }
    let name = match fields.get("name") {
        Some(Primitive::Str(name)) => name.clone(),
        _ => return Err(ParseError::Malformed("variable name must be a string".to_string())),
    };
    let return_type = match fields.get("return_type") {
        Some(Primitive::Type(ty)) => ty.clone(),
        _ => {
            return Err(ParseError::MalformedType(format!(
                "variable {:?} has no type descriptor",
                name
            )))
        }
    };
    let mut var = Variable::new(name, return_type);
    if let Some(default) = fields.get("default") {
        var = var.with_default(default.to_natural_value()?);
    }
    Ok(Expr::Variable(var))
}

fn unexpected(expected: &str, found: &Expr) -> ParseError {
    ParseError::Malformed(format!("expected {}, got {}", expected, found.kind_name()))
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializers: Vec<_> = self.serializers.keys().collect();
        let mut deserializers: Vec<_> = self.deserializers.keys().collect();
        serializers.sort();
        deserializers.sort();
        f.debug_struct("Registry")
            .field("serializers", &serializers)
            .field("deserializers", &deserializers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeDescriptor;
    use bigdecimal::BigDecimal;

    fn num(n: i64) -> Expr {
        Expr::number(n).unwrap()
    }

    #[test]
    fn literals_serialize_to_bare_values() {
        let r = registry();
        assert_eq!(r.serialize(&Expr::null()).unwrap(), Primitive::Null);
        assert_eq!(
            r.serialize(&num(3)).unwrap(),
            Primitive::Decimal(BigDecimal::from(3))
        );
    }

    #[test]
    fn number_tags_route_to_number_literal() {
        let r = registry();
        for data in [
            Primitive::Int(2),
            Primitive::Float(2.0),
            Primitive::Decimal(BigDecimal::from(2)),
        ] {
            assert_eq!(r.deserialize(&data).unwrap(), num(2));
        }
    }

    #[test]
    fn operations_serialize_under_their_tag() {
        let expr = Expr::new(Operator::LessThanOrEqual, vec![num(4), num(5)]).unwrap();
        assert_eq!(
            registry().serialize(&expr).unwrap(),
            Primitive::single(
                "less-than-or-equal",
                Primitive::List(vec![
                    Primitive::Decimal(BigDecimal::from(4)),
                    Primitive::Decimal(BigDecimal::from(5)),
                ])
            )
        );
    }

    #[test]
    fn deserialized_operations_are_validated() {
        let data = Primitive::single("div", Primitive::List(vec![Primitive::Int(1)]));
        assert!(matches!(
            registry().deserialize(&data),
            Err(ParseError::Invalid(_))
        ));
    }

    #[test]
    fn variable_keeps_default_only_when_given() {
        let plain = Expr::variable("x", TypeDescriptor::Int);
        let Primitive::Map(outer) = registry().serialize(&plain).unwrap() else {
            panic!("expected a mapping");
        };
        let Some(Primitive::Map(fields)) = outer.get("var") else {
            panic!("expected var fields");
        };
        assert_eq!(fields.len(), 2);

        let with_default = Expr::Variable(Variable::new("x", TypeDescriptor::Int).with_default(3));
        let data = registry().serialize(&with_default).unwrap();
        assert_eq!(registry().deserialize(&data).unwrap(), with_default);
    }

    #[test]
    fn unknown_tags_and_ambiguous_maps_fail() {
        let r = registry();
        assert_eq!(
            r.deserialize(&Primitive::single("pow", Primitive::List(vec![]))),
            Err(ParseError::UnregisteredTag("pow".to_string()))
        );
        assert_eq!(
            r.deserialize(&Primitive::List(vec![])),
            Err(ParseError::UnregisteredTag("list".to_string()))
        );
        let mut map = IndexMap::new();
        map.insert("and".to_string(), Primitive::List(vec![]));
        map.insert("or".to_string(), Primitive::List(vec![]));
        assert!(matches!(
            r.deserialize(&Primitive::Map(map)),
            Err(ParseError::Ambiguous { .. })
        ));
    }

    #[test]
    fn empty_registry_knows_nothing() {
        let r = Registry::empty();
        assert_eq!(
            r.serialize(&Expr::boolean(true)),
            Err(ParseError::UnregisteredTag("Boolean".to_string()))
        );
    }

    #[test]
    fn registries_can_be_extended() {
        let mut r = Registry::standard();
        r.register_deserializer(
            "yes",
            Arc::new(|_: &Primitive, _: &Registry| Ok(Expr::boolean(true))),
        );
        let data = Primitive::single("yes", Primitive::Null);
        assert_eq!(r.deserialize(&data).unwrap(), Expr::boolean(true));
        assert!(registry().deserialize(&data).is_err());
    }
}
