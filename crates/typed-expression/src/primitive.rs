//! The structured-primitive interchange form.

use crate::error::{ParseError, Violation};
use crate::types::TypeDescriptor;
use crate::value::{decimal_in_range, Value, ValueKind};
use bigdecimal::BigDecimal;
use chrono::{NaiveDateTime, TimeDelta};
use indexmap::IndexMap;
use std::str::FromStr;

/// Generic, non-textual data an expression serializes to.
///
/// `Int`, `Float` and `Decimal` are kept apart so that each selects its own
/// deserializer, even though all three become Number literals.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(BigDecimal),
    Str(String),
    Timestamp(NaiveDateTime),
    Duration(TimeDelta),
    Type(TypeDescriptor),
    List(Vec<Primitive>),
    Map(IndexMap<String, Primitive>),
}

impl Primitive {
    /// A mapping with a single `key`.
    pub fn single(key: impl Into<String>, value: Primitive) -> Self {
        let mut map = IndexMap::with_capacity(1);
        map.insert(key.into(), value);
        Primitive::Map(map)
    }

    /// The name of this primitive's kind, used to select a deserializer.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Primitive::Null => "null",
            Primitive::Bool(_) => "bool",
            Primitive::Int(_) => "int",
            Primitive::Float(_) => "float",
            Primitive::Decimal(_) => "decimal",
            Primitive::Str(_) => "str",
            Primitive::Timestamp(_) => "datetime",
            Primitive::Duration(_) => "timedelta",
            Primitive::Type(_) => "type",
            Primitive::List(_) => "list",
            Primitive::Map(_) => "map",
        }
    }

    /// The only entry of a single-key mapping.
    pub fn single_entry(&self) -> Result<(&str, &Primitive), ParseError> {
        match self {
            Primitive::Map(map) if map.len() == 1 => map
                .iter()
                .next()
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ParseError::Malformed("empty mapping".to_string())),
            Primitive::Map(map) => Err(ParseError::Ambiguous {
                keys: map.keys().cloned().collect(),
            }),
            other => Err(ParseError::Malformed(format!(
                "expected a mapping, got {}",
                other.kind_name()
            ))),
        }
    }

    /// Converts a raw number-like primitive into a decimal.
    ///
    /// Floats go through their shortest textual form so that `2.2` becomes
    /// exactly `2.2` rather than its binary approximation. Decimals whose
    /// exponent is out of range are rejected.
    pub fn to_number(&self) -> Result<BigDecimal, Violation> {
        match self {
            Primitive::Bool(b) => Ok(BigDecimal::from(i64::from(*b))),
            Primitive::Int(n) => Ok(BigDecimal::from(*n)),
            Primitive::Float(f) => parse_decimal(&f.to_string()),
            Primitive::Decimal(d) => checked_range(d.clone(), || {
                let (digits, scale) = d.as_bigint_and_exponent();
                format!("{}e{}", digits, -scale)
            }),
            Primitive::Str(s) => parse_decimal(s),
            other => Err(Violation::Literal {
                found: other.kind_name().to_string(),
                expected: ValueKind::Number,
            }),
        }
    }

    /// Converts this primitive into a value of `kind`.
    pub fn to_value(&self, kind: ValueKind) -> Result<Value, Violation> {
        match (kind, self) {
            (ValueKind::Null, Primitive::Null) => Ok(Value::Null),
            (ValueKind::Boolean, Primitive::Bool(b)) => Ok(Value::Boolean(*b)),
            (ValueKind::Number, raw) => raw.to_number().map(Value::Number),
            (ValueKind::String, Primitive::Str(s)) => Ok(Value::String(s.clone())),
            (ValueKind::Timestamp, Primitive::Timestamp(ts)) => Ok(Value::Timestamp(*ts)),
            (ValueKind::Duration, Primitive::Duration(d)) => Ok(Value::Duration(*d)),
            (expected, other) => Err(Violation::Literal {
                found: other.kind_name().to_string(),
                expected,
            }),
        }
    }

    /// Converts this primitive into whichever value it naturally denotes.
    pub fn to_natural_value(&self) -> Result<Value, ParseError> {
        let kind = match self {
            Primitive::Null => ValueKind::Null,
            Primitive::Bool(_) => ValueKind::Boolean,
            Primitive::Int(_) | Primitive::Float(_) | Primitive::Decimal(_) => ValueKind::Number,
            Primitive::Str(_) => ValueKind::String,
            Primitive::Timestamp(_) => ValueKind::Timestamp,
            Primitive::Duration(_) => ValueKind::Duration,
            other => {
                return Err(ParseError::Malformed(format!(
                    "{} is not a value",
                    other.kind_name()
                )))
            }
        };
        self.to_value(kind)
            .map_err(|violation| ParseError::Malformed(violation.to_string()))
    }
}

fn parse_decimal(text: &str) -> Result<BigDecimal, Violation> {
    let d = BigDecimal::from_str(text.trim()).map_err(|_| Violation::Number {
        input: text.to_string(),
    })?;
    checked_range(d, || text.to_string())
}

fn checked_range(d: BigDecimal, input: impl FnOnce() -> String) -> Result<BigDecimal, Violation> {
    if decimal_in_range(&d) {
        Ok(d)
    } else {
        Err(Violation::Number { input: input() })
    }
}

impl From<Value> for Primitive {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Primitive::Null,
            Value::Boolean(b) => Primitive::Bool(b),
            Value::Number(n) => Primitive::Decimal(n),
            Value::String(s) => Primitive::Str(s),
            Value::Timestamp(ts) => Primitive::Timestamp(ts),
            Value::Duration(d) => Primitive::Duration(d),
        }
    }
}

impl From<bool> for Primitive {
    fn from(b: bool) -> Self {
        Primitive::Bool(b)
    }
}

impl From<i32> for Primitive {
    fn from(n: i32) -> Self {
        Primitive::Int(i64::from(n))
    }
}

impl From<i64> for Primitive {
    fn from(n: i64) -> Self {
        Primitive::Int(n)
    }
}

impl From<f64> for Primitive {
    fn from(f: f64) -> Self {
        Primitive::Float(f)
    }
}

impl From<BigDecimal> for Primitive {
    fn from(d: BigDecimal) -> Self {
        Primitive::Decimal(d)
    }
}

impl From<&str> for Primitive {
    fn from(s: &str) -> Self {
        Primitive::Str(s.to_string())
    }
}

impl From<String> for Primitive {
    fn from(s: String) -> Self {
        Primitive::Str(s)
    }
}

impl From<NaiveDateTime> for Primitive {
    fn from(ts: NaiveDateTime) -> Self {
        Primitive::Timestamp(ts)
    }
}

impl From<TimeDelta> for Primitive {
    fn from(d: TimeDelta) -> Self {
        Primitive::Duration(d)
    }
}

impl From<TypeDescriptor> for Primitive {
    fn from(t: TypeDescriptor) -> Self {
        Primitive::Type(t)
    }
}

impl From<Vec<Primitive>> for Primitive {
    fn from(items: Vec<Primitive>) -> Self {
        Primitive::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn floats_normalize_through_text() {
        assert_eq!(Primitive::Float(2.2).to_number(), Ok(dec("2.2")));
        assert_eq!(Primitive::Float(-1.3).to_number(), Ok(dec("-1.3")));
        assert!(Primitive::Float(f64::NAN).to_number().is_err());
    }

    #[test]
    fn booleans_and_strings_become_numbers() {
        assert_eq!(Primitive::Bool(true).to_number(), Ok(dec("1")));
        assert_eq!(Primitive::from(" 1.5 ").to_number(), Ok(dec("1.5")));
        assert_eq!(
            Primitive::from("abc").to_number(),
            Err(Violation::Number {
                input: "abc".to_string()
            })
        );
    }

    #[test]
    fn huge_exponents_are_rejected() {
        assert_eq!(
            Primitive::from("1E+3000000").to_number(),
            Err(Violation::Number {
                input: "1E+3000000".to_string()
            })
        );
        assert!(Primitive::Decimal(dec("1e-3000000")).to_number().is_err());
        assert_eq!(Primitive::from("1e10000").to_number(), Ok(dec("1e10000")));
        assert!(Primitive::Float(f64::MIN_POSITIVE).to_number().is_ok());
    }

    #[test]
    fn literal_kinds_must_match() {
        assert_eq!(
            Primitive::from("x").to_value(ValueKind::Boolean),
            Err(Violation::Literal {
                found: "str".to_string(),
                expected: ValueKind::Boolean
            })
        );
        assert_eq!(Primitive::Null.to_value(ValueKind::Null), Ok(Value::Null));
    }

    #[test]
    fn single_entry_rejects_ambiguous_mappings() {
        let mut map = IndexMap::new();
        map.insert("add".to_string(), Primitive::List(vec![]));
        map.insert("sub".to_string(), Primitive::List(vec![]));
        assert_eq!(
            Primitive::Map(map).single_entry(),
            Err(ParseError::Ambiguous {
                keys: vec!["add".to_string(), "sub".to_string()]
            })
        );
        assert!(matches!(
            Primitive::Map(IndexMap::new()).single_entry(),
            Err(ParseError::Ambiguous { .. })
        ));
    }
}
