//! JSON text codec for structured primitives.
//!
//! JSON has no native form for arbitrary-precision decimals, timestamps,
//! durations or type descriptors, so those are written as tagged objects:
//!
//! ```json
//! {"__class__": "bignum", "__value__": "123456789012345678901234567890.123"}
//! {"__class__": "datetime", "__value__": "2024-01-02T03:04:05.5"}
//! {"__class__": "timedelta", "__value__": 90.25}
//! {"__class__": "type", "__value__": "dict", "__args__": [...]}
//! ```
//!
//! Decimals that survive a trip through a float are written as bare numbers.

use crate::error::ParseError;
use crate::primitive::Primitive;
use crate::types::TypeDescriptor;
use crate::value::{decimal_in_range, TIMESTAMP_FORMAT};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value as Json};
use std::str::FromStr;
use tracing::debug;

pub const CLASS_KEY: &str = "__class__";
pub const VALUE_KEY: &str = "__value__";
pub const ARGS_KEY: &str = "__args__";

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// Output options for JSON text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonOptions {
    /// Emit indented, multi-line JSON instead of compact text.
    pub pretty: bool,
}

impl JsonOptions {
    pub fn pretty() -> Self {
        JsonOptions { pretty: true }
    }
}

/// Writes `data` as JSON text.
pub fn to_string(data: &Primitive, options: &JsonOptions) -> Result<String, ParseError> {
    let json = encode(data)?;
    let text = if options.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(text)
}

/// Reads JSON text into a structured primitive.
pub fn from_str(text: &str) -> Result<Primitive, ParseError> {
    let json: Json = serde_json::from_str(text)?;
    decode(json)
}

pub fn encode(data: &Primitive) -> Result<Json, ParseError> {
    Ok(match data {
        Primitive::Null => Json::Null,
        Primitive::Bool(b) => Json::Bool(*b),
        Primitive::Int(n) => Json::Number(Number::from(*n)),
        Primitive::Float(f) => Number::from_f64(*f).map(Json::Number).ok_or_else(|| {
            ParseError::NotRepresentable(format!("{} has no JSON number form", f))
        })?,
        Primitive::Decimal(d) => encode_decimal(d)?,
        Primitive::Str(s) => Json::String(s.clone()),
        Primitive::Timestamp(ts) => tagged(
            "datetime",
            Json::String(ts.format(TIMESTAMP_FORMAT).to_string()),
        ),
        Primitive::Duration(d) => tagged("timedelta", Json::Number(number(&duration_seconds(d))?)),
        Primitive::Type(ty) => encode_type(ty),
        Primitive::List(items) => Json::Array(items.iter().map(encode).collect::<Result<_, _>>()?),
        Primitive::Map(map) => {
            let mut object = Map::with_capacity(map.len());
            for (key, value) in map {
                object.insert(key.clone(), encode(value)?);
            }
            Json::Object(object)
        }
    })
}

pub fn decode(json: Json) -> Result<Primitive, ParseError> {
    Ok(match json {
        Json::Null => Primitive::Null,
        Json::Bool(b) => Primitive::Bool(b),
        Json::Number(n) => Primitive::Decimal(parse_decimal(&n.to_string())?),
        Json::String(s) => Primitive::Str(s),
        Json::Array(items) => {
            Primitive::List(items.into_iter().map(decode).collect::<Result<_, _>>()?)
        }
        Json::Object(object) => decode_object(object)?,
    })
}

fn tagged(class: &str, value: Json) -> Json {
    let mut object = Map::with_capacity(2);
    object.insert(CLASS_KEY.to_string(), Json::String(class.to_string()));
    object.insert(VALUE_KEY.to_string(), value);
    Json::Object(object)
}

fn number(text: &str) -> Result<Number, ParseError> {
    Ok(serde_json::from_str(text)?)
}

fn encode_decimal(d: &BigDecimal) -> Result<Json, ParseError> {
    if d.is_integer() {
        let (digits, scale) = d.as_bigint_and_exponent();
        let text = match scale {
            0 => digits.to_string(),
            s if s > 0 => d.with_scale(0).to_string(),
            s => format!("{}e{}", digits, -s),
        };
        return Ok(Json::Number(number(&text)?));
    }
    let text = d.to_string();
    let float_safe = text
        .parse::<f64>()
        .map(|f| f.is_finite() && f.to_string() == text)
        .unwrap_or(false);
    if float_safe {
        Ok(Json::Number(number(&text)?))
    } else {
        debug!(decimal = %text, "writing decimal as tagged bignum");
        Ok(tagged("bignum", Json::String(text)))
    }
}

fn encode_type(ty: &TypeDescriptor) -> Json {
    let mut object = Map::with_capacity(3);
    object.insert(CLASS_KEY.to_string(), Json::String("type".to_string()));
    object.insert(VALUE_KEY.to_string(), Json::String(ty.name().to_string()));
    if !ty.args().is_empty() {
        object.insert(
            ARGS_KEY.to_string(),
            Json::Array(ty.args().iter().map(encode_type).collect()),
        );
    }
    Json::Object(object)
}

/// Total seconds of `d` as exact decimal text.
fn duration_seconds(d: &TimeDelta) -> String {
    let nanos = i128::from(d.num_seconds()) * NANOS_PER_SECOND + i128::from(d.subsec_nanos());
    let sign = if nanos < 0 { "-" } else { "" };
    let nanos = nanos.abs();
    let (secs, frac) = (nanos / NANOS_PER_SECOND, nanos % NANOS_PER_SECOND);
    if frac == 0 {
        return format!("{}{}", sign, secs);
    }
    let frac = format!("{:09}", frac);
    format!("{}{}.{}", sign, secs, frac.trim_end_matches('0'))
}

fn decode_object(object: Map<String, Json>) -> Result<Primitive, ParseError> {
    let class = match object.get(CLASS_KEY) {
        Some(Json::String(class)) => class.clone(),
        _ => return decode_map(object),
    };
    let value = object.get(VALUE_KEY);
    match (class.as_str(), value) {
        ("bignum", Some(value)) => {
            Ok(Primitive::Decimal(parse_decimal(&scalar_text(value)?)?))
        }
        ("datetime", Some(Json::String(text))) => {
            Ok(Primitive::Timestamp(parse_timestamp(text)?))
        }
        ("timedelta", Some(value)) => {
            Ok(Primitive::Duration(parse_duration(&scalar_text(value)?)?))
        }
        ("type", _) => Ok(Primitive::Type(decode_type(&object)?)),
        ("bignum" | "datetime" | "timedelta", _) => Err(ParseError::Malformed(format!(
            "tagged {} object has no usable {}",
            class, VALUE_KEY
        ))),
        _ => {
            debug!(class = %class, "passing unknown tagged object through");
            decode_map(object)
        }
    }
}

fn decode_map(object: Map<String, Json>) -> Result<Primitive, ParseError> {
    let mut map = IndexMap::with_capacity(object.len());
    for (key, value) in object {
        map.insert(key, decode(value)?);
    }
    Ok(Primitive::Map(map))
}

fn decode_type(object: &Map<String, Json>) -> Result<TypeDescriptor, ParseError> {
    let name = match object.get(VALUE_KEY) {
        Some(Json::String(name)) => name,
        _ => {
            return Err(ParseError::MalformedType(format!(
                "type object needs a string {}",
                VALUE_KEY
            )))
        }
    };
    let args = match object.get(ARGS_KEY) {
        None => Vec::new(),
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| match item {
                Json::Object(arg) if arg.get(CLASS_KEY) == Some(&Json::from("type")) => {
                    decode_type(arg)
                }
                other => Err(ParseError::MalformedType(format!(
                    "type parameter {} is not a type",
                    other
                ))),
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(ParseError::MalformedType(format!(
                "{} must be a list, got {}",
                ARGS_KEY, other
            )))
        }
    };
    TypeDescriptor::from_parts(name, args)
}

fn scalar_text(value: &Json) -> Result<String, ParseError> {
    match value {
        Json::Number(n) => Ok(n.to_string()),
        Json::String(s) => Ok(s.clone()),
        other => Err(ParseError::Malformed(format!(
            "expected a number or a string, got {}",
            other
        ))),
    }
}

fn parse_decimal(text: &str) -> Result<BigDecimal, ParseError> {
    let d = BigDecimal::from_str(text.trim())
        .map_err(|_| ParseError::Malformed(format!("{:?} is not a decimal", text)))?;
    if !decimal_in_range(&d) {
        return Err(ParseError::Malformed(format!("{:?} has an exponent out of range", text)));
    }
    Ok(d)
}

fn parse_timestamp(text: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
        })
        .map_err(|_| ParseError::Malformed(format!("{:?} is not an ISO-8601 timestamp", text)))
}

fn parse_duration(text: &str) -> Result<TimeDelta, ParseError> {
    let out_of_range = || ParseError::Malformed(format!("{:?} seconds is out of range", text));
    let seconds = parse_decimal(text)?;
    let nanos = (seconds * BigDecimal::from(1_000_000_000))
        .with_scale(0)
        .to_string()
        .parse::<i128>()
        .map_err(|_| out_of_range())?;
    let secs = i64::try_from(nanos / NANOS_PER_SECOND).map_err(|_| out_of_range())?;
    let rem = i64::try_from(nanos % NANOS_PER_SECOND).map_err(|_| out_of_range())?;
    TimeDelta::try_seconds(secs)
        .and_then(|whole| whole.checked_add(&TimeDelta::nanoseconds(rem)))
        .ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn compact(data: &Primitive) -> String {
        to_string(data, &JsonOptions::default()).unwrap()
    }

    #[test]
    fn decimals_stay_bare_when_floats_hold_them() {
        assert_eq!(compact(&Primitive::Decimal(dec("1.3"))), "1.3");
        assert_eq!(compact(&Primitive::Decimal(dec("5.00"))), "5");
        assert_eq!(
            encode(&Primitive::Decimal(dec("123456789012345678901234567890.123"))).unwrap(),
            json!({"__class__": "bignum", "__value__": "123456789012345678901234567890.123"})
        );
    }

    #[test]
    fn numbers_decode_exactly() {
        assert_eq!(
            from_str("123456789012345678901234567890.123").unwrap(),
            Primitive::Decimal(dec("123456789012345678901234567890.123"))
        );
        assert_eq!(
            from_str(r#"{"__class__": "bignum", "__value__": "0.1"}"#).unwrap(),
            Primitive::Decimal(dec("0.1"))
        );
    }

    #[test]
    fn large_integers_keep_their_exponent() {
        let data = Primitive::Decimal(dec("1E+50"));
        assert_eq!(compact(&data), "1e50");
        assert_eq!(from_str("1e50").unwrap(), data);
        assert_eq!(compact(&Primitive::Decimal(dec("-12E+3"))), "-12e3");
    }

    #[test]
    fn huge_exponents_are_malformed() {
        for text in [
            "1e3000000",
            "[1E-3000000]",
            r#"{"__class__": "bignum", "__value__": "1E+3000000"}"#,
        ] {
            assert!(matches!(from_str(text), Err(ParseError::Malformed(_))), "{}", text);
        }
        assert!(from_str("1e10000").is_ok());
    }

    #[test]
    fn timestamps_use_iso_format() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_milli_opt(3, 4, 5, 500)
            .unwrap();
        let json = encode(&Primitive::Timestamp(ts)).unwrap();
        assert_eq!(
            json,
            json!({"__class__": "datetime", "__value__": "2024-01-02T03:04:05.500"})
        );
        assert_eq!(decode(json).unwrap(), Primitive::Timestamp(ts));

        let midnight = from_str(r#"{"__class__": "datetime", "__value__": "2024-01-02"}"#).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(midnight, Primitive::Timestamp(date.and_time(NaiveTime::MIN)));
        assert!(from_str(r#"{"__class__": "datetime", "__value__": "yesterday"}"#).is_err());
    }

    #[test]
    fn durations_are_total_seconds() {
        let d = TimeDelta::seconds(90) + TimeDelta::milliseconds(250);
        let json = encode(&Primitive::Duration(d)).unwrap();
        assert_eq!(
            compact(&Primitive::Duration(d)),
            r#"{"__class__":"timedelta","__value__":90.25}"#
        );
        assert_eq!(decode(json).unwrap(), Primitive::Duration(d));

        let negative = -TimeDelta::milliseconds(1500);
        assert_eq!(duration_seconds(&negative), "-1.5");
        assert_eq!(
            decode(encode(&Primitive::Duration(negative)).unwrap()).unwrap(),
            Primitive::Duration(negative)
        );
        assert_eq!(
            from_str(r#"{"__class__": "timedelta", "__value__": "60"}"#).unwrap(),
            Primitive::Duration(TimeDelta::minutes(1))
        );
    }

    #[test]
    fn type_descriptors_nest() {
        let ty = TypeDescriptor::dict(
            TypeDescriptor::Str,
            TypeDescriptor::list(TypeDescriptor::Int),
        );
        let json = encode(&Primitive::Type(ty.clone())).unwrap();
        assert_eq!(
            json,
            json!({
                "__class__": "type",
                "__value__": "dict",
                "__args__": [
                    {"__class__": "type", "__value__": "str"},
                    {"__class__": "type", "__value__": "list", "__args__": [
                        {"__class__": "type", "__value__": "int"}
                    ]}
                ]
            })
        );
        assert_eq!(decode(json).unwrap(), Primitive::Type(ty));
    }

    #[test]
    fn malformed_types_are_rejected() {
        for text in [
            r#"{"__class__": "type", "__value__": "complex"}"#,
            r#"{"__class__": "type", "__value__": 3}"#,
            r#"{"__class__": "type", "__value__": "list", "__args__": [1]}"#,
        ] {
            assert!(matches!(from_str(text), Err(ParseError::MalformedType(_))), "{}", text);
        }
    }

    #[test]
    fn unknown_classes_pass_through() {
        let data = from_str(r#"{"__class__": "complex", "__value__": [1, 2]}"#).unwrap();
        let Primitive::Map(map) = data else {
            panic!("expected a mapping");
        };
        assert_eq!(map.get("__class__"), Some(&Primitive::from("complex")));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn pretty_output_is_indented() {
        let data = Primitive::single("not", Primitive::List(vec![Primitive::Bool(true)]));
        let text = to_string(&data, &JsonOptions::pretty()).unwrap();
        assert!(text.contains('\n'));
        assert_eq!(from_str(&text).unwrap(), data);
    }

    #[test]
    fn nan_floats_are_not_representable() {
        assert!(matches!(
            encode(&Primitive::Float(f64::NAN)),
            Err(ParseError::NotRepresentable(_))
        ));
    }
}
