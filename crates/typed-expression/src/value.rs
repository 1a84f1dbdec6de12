//! Runtime values produced by evaluation.

use bigdecimal::BigDecimal;
use chrono::{NaiveDateTime, TimeDelta};
use std::cmp::Ordering;
use std::fmt;

/// ISO-8601 layout used whenever a timestamp is rendered as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Largest decimal exponent, in either direction, accepted for a number.
///
/// Decimal arithmetic expands operands to a common scale, so the scale of
/// every number entering a tree is bounded.
pub const MAX_DECIMAL_SCALE: u64 = 10_000;

/// Whether `n` has a scale within [`MAX_DECIMAL_SCALE`].
pub fn decimal_in_range(n: &BigDecimal) -> bool {
    let (_, scale) = n.as_bigint_and_exponent();
    scale.unsigned_abs() <= MAX_DECIMAL_SCALE
}

/// The closed set of runtime value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Timestamp,
    Duration,
}

impl ValueKind {
    /// Name of the literal expression wrapping values of this kind.
    pub fn literal_name(self) -> &'static str {
        match self {
            ValueKind::Null => "Null",
            ValueKind::Boolean => "Boolean",
            ValueKind::Number => "Number",
            ValueKind::String => "String",
            ValueKind::Timestamp => "Datetime",
            ValueKind::Duration => "Timedelta",
        }
    }

    /// Whether values of this kind can be ordered, not only tested for equality.
    pub fn is_ordered(self) -> bool {
        !matches!(self, ValueKind::Null)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal_name())
    }
}

/// A concrete runtime datum.
///
/// Numbers are arbitrary-precision decimals and compare by numeric value, so
/// `1.30` and `1.3` are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(BigDecimal),
    String(String),
    Timestamp(NaiveDateTime),
    Duration(TimeDelta),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Timestamp(_) => ValueKind::Timestamp,
            Value::Duration(_) => ValueKind::Duration,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

/// Values order first by kind, then by the natural order of that kind.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
            (Value::Duration(a), Value::Duration(b)) => a.cmp(b),
            _ => self.kind().cmp(&other.kind()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
            Value::Duration(d) => write!(f, "{}", d),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(BigDecimal::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(BigDecimal::from(n))
    }
}

impl From<BigDecimal> for Value {
    fn from(n: BigDecimal) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(ts: NaiveDateTime) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<TimeDelta> for Value {
    fn from(d: TimeDelta) -> Self {
        Value::Duration(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn numbers_compare_by_value() {
        let a = Value::Number(BigDecimal::from_str("1.30").unwrap());
        let b = Value::Number(BigDecimal::from_str("1.3").unwrap());
        assert_eq!(a, b);
        assert!(Value::from(2) > Value::from(1));
    }

    #[test]
    fn decimal_scale_is_bounded() {
        assert!(decimal_in_range(&BigDecimal::from_str("1E+10000").unwrap()));
        assert!(decimal_in_range(&BigDecimal::from_str("1E-10000").unwrap()));
        assert!(!decimal_in_range(&BigDecimal::from_str("1E+10001").unwrap()));
        assert!(!decimal_in_range(&BigDecimal::from_str("1E-3000000").unwrap()));
    }

    #[test]
    fn different_kinds_order_by_kind() {
        assert!(Value::Null < Value::from(false));
        assert!(Value::from(true) < Value::from(0));
        assert_ne!(Value::from(1), Value::from("1"));
    }

    #[test]
    fn durations_and_timestamps_order_naturally() {
        assert!(Value::from(TimeDelta::minutes(3)) < Value::from(TimeDelta::hours(2)));
        let early = NaiveDateTime::from_str("2020-10-12T00:00:00").unwrap();
        let late = NaiveDateTime::from_str("2021-01-02T00:00:00").unwrap();
        assert!(Value::from(early) < Value::from(late));
    }
}
