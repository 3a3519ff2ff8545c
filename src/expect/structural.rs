//! Property and subset matchers over serde-serialized values.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

use super::{AssertionError, Expectation};

/// Serialize a value for structural comparison.
pub(super) fn serialize<T: Serialize + ?Sized>(
    value: &T,
    matcher: &str,
) -> Result<Value, AssertionError> {
    serde_json::to_value(value).map_err(|e| AssertionError {
        subject: "received".to_string(),
        matcher: matcher.to_string(),
        expected: "a serializable value".to_string(),
        actual: format!("serialization error: {}", e),
    })
}

/// Follow a dotted key path (`"a.b.0"`) into a value.
fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Equality where numbers compare by value, so `8` equals `8.0`.
fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => actual == expected,
    }
}

/// Whether every field of `expected` is present and matching in `actual`.
///
/// Objects may carry extra fields at any depth. Arrays must have the same
/// length and match element by element.
fn is_subset(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => e
            .iter()
            .all(|(k, ev)| a.get(k).is_some_and(|av| is_subset(av, ev))),
        (Value::Array(a), Value::Array(e)) => {
            a.len() == e.len() && a.iter().zip(e).all(|(x, y)| is_subset(x, y))
        }
        _ => values_equal(actual, expected),
    }
}

impl<'a, T: Serialize + ?Sized> Expectation<'a, T> {
    /// The serialized value has a field at `path`, whatever its value.
    pub fn to_have_property(&self, path: &str) -> Result<(), AssertionError> {
        let actual = serialize(self.actual, "to_have_property")?;
        self.verdict(
            "received",
            "to_have_property",
            lookup(&actual, path).is_some(),
            || format!("property `{}`", path),
            || actual.to_string(),
        )
    }

    /// The serialized value has a field at `path` equal to `expected`.
    pub fn to_have_property_value<U>(&self, path: &str, expected: U) -> Result<(), AssertionError>
    where
        U: Serialize + Debug,
    {
        let actual = serialize(self.actual, "to_have_property_value")?;
        let wanted = serialize(&expected, "to_have_property_value")?;
        let found = lookup(&actual, path);
        self.verdict(
            "received",
            "to_have_property_value",
            found.is_some_and(|v| values_equal(v, &wanted)),
            || format!("`{}` = {}", path, wanted),
            || match found {
                Some(v) => format!("`{}` = {}", path, v),
                None => format!("no property `{}`", path),
            },
        )
    }

    /// The serialized value contains every field of `expected`.
    pub fn to_match_object<U>(&self, expected: U) -> Result<(), AssertionError>
    where
        U: Serialize,
    {
        let actual = serialize(self.actual, "to_match_object")?;
        let expected = serialize(&expected, "to_match_object")?;
        self.verdict(
            "received",
            "to_match_object",
            is_subset(&actual, &expected),
            || expected.to_string(),
            || actual.to_string(),
        )
    }
}
