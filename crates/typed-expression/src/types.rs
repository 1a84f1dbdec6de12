use crate::error::{ParseError, Violation};
use crate::value::{Value, ValueKind};
use std::fmt;

/// How many direct sub-expressions an expression variant may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Nullary,
    Unary,
    Binary,
    Ternary,
    /// Any number of operands, including none.
    NAry,
    AtLeastTwo,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Nullary => count == 0,
            Arity::Unary => count == 1,
            Arity::Binary => count == 2,
            Arity::Ternary => count == 3,
            Arity::NAry => true,
            Arity::AtLeastTwo => count >= 2,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Arity::Nullary => "no operands",
            Arity::Unary => "one operand",
            Arity::Binary => "two operands",
            Arity::Ternary => "three operands",
            Arity::NAry => "any number of operands",
            Arity::AtLeastTwo => "at least two operands",
        })
    }
}

/// Asserts that an operand list has a length compatible with `arity`.
pub fn assert_arity(arity: Arity, found: usize) -> Result<(), Violation> {
    if arity.accepts(found) {
        Ok(())
    } else {
        Err(Violation::Arity {
            expected: arity,
            found,
        })
    }
}

/// A reified type, used as data to declare what a variable holds.
///
/// Container kinds carry their parameters in order; an empty parameter
/// list means the container is unparameterized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Null,
    Bool,
    Int,
    Float,
    Bignum,
    Str,
    Datetime,
    Timedelta,
    Tuple(Vec<TypeDescriptor>),
    List(Vec<TypeDescriptor>),
    Dict(Vec<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn list(item: TypeDescriptor) -> Self {
        TypeDescriptor::List(vec![item])
    }

    pub fn dict(key: TypeDescriptor, value: TypeDescriptor) -> Self {
        TypeDescriptor::Dict(vec![key, value])
    }

    /// Descriptor of the values wrapped by a literal of `kind`.
    pub fn of_kind(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Null => TypeDescriptor::Null,
            ValueKind::Boolean => TypeDescriptor::Bool,
            ValueKind::Number => TypeDescriptor::Bignum,
            ValueKind::String => TypeDescriptor::Str,
            ValueKind::Timestamp => TypeDescriptor::Datetime,
            ValueKind::Duration => TypeDescriptor::Timedelta,
        }
    }

    /// Rebuilds a descriptor from its kind name and parameters.
    pub fn from_parts(name: &str, args: Vec<TypeDescriptor>) -> Result<Self, ParseError> {
        let scalar = match name {
            "null" => TypeDescriptor::Null,
            "bool" => TypeDescriptor::Bool,
            "int" => TypeDescriptor::Int,
            "float" => TypeDescriptor::Float,
            "bignum" => TypeDescriptor::Bignum,
            "str" => TypeDescriptor::Str,
            "datetime" => TypeDescriptor::Datetime,
            "timedelta" => TypeDescriptor::Timedelta,
            "tuple" => return Ok(TypeDescriptor::Tuple(args)),
            "list" => return Ok(TypeDescriptor::List(args)),
            "dict" => return Ok(TypeDescriptor::Dict(args)),
            other => {
                return Err(ParseError::MalformedType(format!(
                    "unknown type name {:?}",
                    other
                )))
            }
        };
        if !args.is_empty() {
            return Err(ParseError::MalformedType(format!(
                "type {:?} takes no parameters",
                name
            )));
        }
        Ok(scalar)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeDescriptor::Null => "null",
            TypeDescriptor::Bool => "bool",
            TypeDescriptor::Int => "int",
            TypeDescriptor::Float => "float",
            TypeDescriptor::Bignum => "bignum",
            TypeDescriptor::Str => "str",
            TypeDescriptor::Datetime => "datetime",
            TypeDescriptor::Timedelta => "timedelta",
            TypeDescriptor::Tuple(_) => "tuple",
            TypeDescriptor::List(_) => "list",
            TypeDescriptor::Dict(_) => "dict",
        }
    }

    pub fn args(&self) -> &[TypeDescriptor] {
        match self {
            TypeDescriptor::Tuple(args)
            | TypeDescriptor::List(args)
            | TypeDescriptor::Dict(args) => args,
            _ => &[],
        }
    }

    /// The runtime value kind this descriptor evaluates to, if it is a scalar.
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            TypeDescriptor::Null => Some(ValueKind::Null),
            TypeDescriptor::Bool => Some(ValueKind::Boolean),
            TypeDescriptor::Int | TypeDescriptor::Float | TypeDescriptor::Bignum => {
                Some(ValueKind::Number)
            }
            TypeDescriptor::Str => Some(ValueKind::String),
            TypeDescriptor::Datetime => Some(ValueKind::Timestamp),
            TypeDescriptor::Timedelta => Some(ValueKind::Duration),
            TypeDescriptor::Tuple(_) | TypeDescriptor::List(_) | TypeDescriptor::Dict(_) => None,
        }
    }

    /// Whether `value` is an instance of this type.
    ///
    /// `int` only admits integral numbers; containers admit nothing since
    /// the value model has no containers.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeDescriptor::Int, Value::Number(n)) => n.is_integer(),
            _ => self.value_kind() == Some(value.kind()),
        }
    }
}

impl From<ValueKind> for TypeDescriptor {
    fn from(kind: ValueKind) -> Self {
        TypeDescriptor::of_kind(kind)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        let args = self.args();
        if !args.is_empty() {
            f.write_str("[")?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn arity_contracts() {
        assert!(Arity::Nullary.accepts(0));
        assert!(!Arity::Unary.accepts(2));
        assert!(Arity::NAry.accepts(0));
        assert!(!Arity::AtLeastTwo.accepts(1));
        assert!(Arity::AtLeastTwo.accepts(5));
        assert_eq!(
            assert_arity(Arity::Binary, 1),
            Err(Violation::Arity {
                expected: Arity::Binary,
                found: 1
            })
        );
    }

    #[test]
    fn int_only_matches_integral_numbers() {
        let whole = Value::Number(BigDecimal::from_str("5.00").unwrap());
        let frac = Value::Number(BigDecimal::from_str("5.5").unwrap());
        assert!(TypeDescriptor::Int.matches(&whole));
        assert!(!TypeDescriptor::Int.matches(&frac));
        assert!(TypeDescriptor::Float.matches(&frac));
        assert!(!TypeDescriptor::Int.matches(&Value::from("hello")));
        assert!(!TypeDescriptor::list(TypeDescriptor::Int).matches(&Value::from(1)));
    }

    #[test]
    fn from_parts_validates_parameters() {
        assert_eq!(
            TypeDescriptor::from_parts("dict", vec![TypeDescriptor::Str, TypeDescriptor::Int]),
            Ok(TypeDescriptor::dict(TypeDescriptor::Str, TypeDescriptor::Int))
        );
        assert!(TypeDescriptor::from_parts("int", vec![TypeDescriptor::Str]).is_err());
        assert!(TypeDescriptor::from_parts("complex", vec![]).is_err());
    }

    #[test]
    fn display_includes_parameters() {
        let ty = TypeDescriptor::dict(
            TypeDescriptor::Str,
            TypeDescriptor::list(TypeDescriptor::Int),
        );
        assert_eq!(ty.to_string(), "dict[str, list[int]]");
    }
}
