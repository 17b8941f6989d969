use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Value;
use serde_json::Value as JsonValue;

use super::FilterError;

const LIKE_KEY: &str = "like";
const FROM_KEY: &str = "from";
const TO_KEY: &str = "to";
const MAX_TEXT_LENGTH: usize = 10_000;

/// A plain value compared for equality or used as a range bound.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&ScalarValue> for Value {
    fn from(value: &ScalarValue) -> Self {
        match value {
            ScalarValue::String(s) => Value::from(s.clone()),
            ScalarValue::Int(i) => Value::from(*i),
            ScalarValue::Float(f) => Value::from(*f),
            ScalarValue::Bool(b) => Value::from(*b),
        }
    }
}

/// One side of a range.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Scalar(ScalarValue),
    DateTime(DateTime<FixedOffset>),
}

impl From<&Bound> for Value {
    fn from(bound: &Bound) -> Self {
        match bound {
            Bound::Scalar(scalar) => Value::from(scalar),
            Bound::DateTime(at) => Value::from(*at),
        }
    }
}

macro_rules! bound_from_scalar {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Bound {
                fn from(value: $ty) -> Self {
                    Self::Scalar(ScalarValue::from(value))
                }
            }
        )+
    };
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

bound_from_scalar!(&str, String, i32, i64, f64, bool);

impl From<DateTime<FixedOffset>> for Bound {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for Bound {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

/// The match criterion for a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Exact equality
    Scalar(ScalarValue),
    /// Exact equality on a timestamp
    DateTime(DateTime<FixedOffset>),
    /// Inclusive bounds; a missing side is unconstrained
    Range {
        from: Option<Bound>,
        to: Option<Bound>,
    },
    /// Substring match
    PartialMatch(String),
    /// `IS NULL`
    Empty,
}

impl FilterValue {
    pub fn range(from: Option<impl Into<Bound>>, to: Option<impl Into<Bound>>) -> Self {
        Self::Range {
            from: from.map(Into::into),
            to: to.map(Into::into),
        }
    }

    pub fn partial(text: impl Into<String>) -> Self {
        Self::PartialMatch(text.into())
    }

    /// Interpret one entry of a JSON filter object.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedValue`] for arrays, objects that are
    /// neither a range nor a partial match, and oversized text.
    pub fn from_json(field: &str, value: &JsonValue) -> Result<Self, FilterError> {
        let unsupported = |reason: &str| FilterError::UnsupportedValue {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        match value {
            JsonValue::Null => Ok(Self::Empty),
            JsonValue::Object(object) => {
                if let Some(text) = object.get(LIKE_KEY) {
                    if object.len() != 1 {
                        return Err(unsupported("'like' cannot be combined with other keys"));
                    }
                    let text = text
                        .as_str()
                        .ok_or_else(|| unsupported("'like' expects a string"))?;
                    if text.len() > MAX_TEXT_LENGTH {
                        return Err(unsupported("text is too long"));
                    }
                    return Ok(Self::PartialMatch(text.to_string()));
                }

                if object.is_empty() || object.keys().any(|k| k != FROM_KEY && k != TO_KEY) {
                    return Err(unsupported("expected 'from'/'to' or 'like'"));
                }
                let bound = |key: &str| -> Result<Option<Bound>, FilterError> {
                    match object.get(key) {
                        None | Some(JsonValue::Null) => Ok(None),
                        Some(raw) => bound_from_json(raw)
                            .map(Some)
                            .ok_or_else(|| unsupported("range bounds must be scalars or dates")),
                    }
                };
                Ok(Self::Range {
                    from: bound(FROM_KEY)?,
                    to: bound(TO_KEY)?,
                })
            }
            JsonValue::Array(_) => Err(unsupported("arrays are not supported")),
            JsonValue::String(text) if text.len() > MAX_TEXT_LENGTH => {
                Err(unsupported("text is too long"))
            }
            scalar => match bound_from_json(scalar) {
                Some(Bound::Scalar(s)) => Ok(Self::Scalar(s)),
                Some(Bound::DateTime(at)) => Ok(Self::DateTime(at)),
                None => Err(unsupported("unrecognised value")),
            },
        }
    }
}

fn bound_from_json(value: &JsonValue) -> Option<Bound> {
    match value {
        JsonValue::Bool(b) => Some(Bound::Scalar(ScalarValue::Bool(*b))),
        JsonValue::Number(n) => n
            .as_i64()
            .map(ScalarValue::Int)
            .or_else(|| n.as_f64().map(ScalarValue::Float))
            .map(Bound::Scalar),
        JsonValue::String(s) => Some(DateTime::parse_from_rfc3339(s).map_or_else(
            |_| Bound::Scalar(ScalarValue::String(s.clone())),
            Bound::DateTime,
        )),
        _ => None,
    }
}

macro_rules! filter_value_from_scalar {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(ScalarValue::from(value))
                }
            }
        )+
    };
}

filter_value_from_scalar!(&str, String, i32, i64, f64, bool);

impl From<DateTime<FixedOffset>> for FilterValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: JsonValue) -> Result<FilterValue, FilterError> {
        FilterValue::from_json("field", &value)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse(json!("Widget")).unwrap(), FilterValue::from("Widget"));
        assert_eq!(parse(json!(42)).unwrap(), FilterValue::from(42_i64));
        assert_eq!(parse(json!(2.5)).unwrap(), FilterValue::from(2.5));
        assert_eq!(parse(json!(true)).unwrap(), FilterValue::from(true));
    }

    #[test]
    fn test_rfc3339_string_is_a_date() {
        let value = parse(json!("2024-03-01T12:00:00+02:00")).unwrap();
        let expected = DateTime::parse_from_rfc3339("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(value, FilterValue::DateTime(expected));
    }

    #[test]
    fn test_null_is_empty_marker() {
        assert_eq!(parse(JsonValue::Null).unwrap(), FilterValue::Empty);
    }

    #[test]
    fn test_range_with_one_bound() {
        let value = parse(json!({"from": 10})).unwrap();
        assert_eq!(
            value,
            FilterValue::Range {
                from: Some(Bound::from(10_i64)),
                to: None
            }
        );

        let value = parse(json!({"from": null, "to": "m"})).unwrap();
        assert_eq!(value, FilterValue::range(None::<i64>, Some("m")));
    }

    #[test]
    fn test_zero_is_a_real_bound() {
        let value = parse(json!({"from": 0, "to": 0})).unwrap();
        assert_eq!(value, FilterValue::range(Some(0_i64), Some(0_i64)));
    }

    #[test]
    fn test_like_object() {
        assert_eq!(
            parse(json!({"like": "wid"})).unwrap(),
            FilterValue::partial("wid")
        );
    }

    #[test]
    fn test_rejected_shapes() {
        assert!(parse(json!([1, 2])).is_err());
        assert!(parse(json!({})).is_err());
        assert!(parse(json!({"like": 5})).is_err());
        assert!(parse(json!({"like": "a", "from": 1})).is_err());
        assert!(parse(json!({"between": [1, 2]})).is_err());
        assert!(parse(json!({"from": [1]})).is_err());
    }

    #[test]
    fn test_error_names_the_field() {
        let err = FilterValue::from_json("price", &json!([1])).unwrap_err();
        assert!(err.to_string().contains("price"));
    }
}
