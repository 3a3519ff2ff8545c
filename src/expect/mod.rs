//! Assertion engine.
//!
//! `expect(&value)` wraps a value; each matcher is evaluated immediately and
//! returns `Err(AssertionError)` on mismatch, so test bodies fail fast with
//! `?`. Matchers are grouped by what they inspect:
//!
//! - `mod.rs`: equality, length and snapshots
//! - `structural`: properties and subset matching over serialized values
//! - `mocks`: call history of mocks and spies
//! - `future`: settlement of futures returning `Result`

mod future;
mod mocks;
mod structural;

pub use future::{expect_future, FutureExpectation};

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt::Debug;
use thiserror::Error;

use crate::runner::TestContext;
use crate::snapshot::SnapshotOutcome;

/// An expectation that did not hold.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expect({subject}).{matcher}: expected {expected}, received {actual}")]
pub struct AssertionError {
    /// What was inspected: "received" for plain values, the mock name for mocks.
    pub subject: String,
    pub matcher: String,
    pub expected: String,
    pub actual: String,
}

/// A value under test, optionally negated.
pub struct Expectation<'a, T: ?Sized> {
    actual: &'a T,
    negated: bool,
}

/// Start an expectation on `actual`.
pub fn expect<T: ?Sized>(actual: &T) -> Expectation<'_, T> {
    Expectation {
        actual,
        negated: false,
    }
}

impl<'a, T: ?Sized> Expectation<'a, T> {
    /// Invert the next matcher.
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Turn a raw comparison into a verdict, honoring negation.
    fn verdict(
        &self,
        subject: impl Into<String>,
        matcher: &str,
        pass: bool,
        expected: impl FnOnce() -> String,
        actual: impl FnOnce() -> String,
    ) -> Result<(), AssertionError> {
        if pass != self.negated {
            return Ok(());
        }
        let (matcher, expected) = if self.negated {
            (format!("not.{}", matcher), format!("not {}", expected()))
        } else {
            (matcher.to_string(), expected())
        };
        Err(AssertionError {
            subject: subject.into(),
            matcher,
            expected,
            actual: actual(),
        })
    }

    /// Equality for plain values.
    pub fn to_be<U>(&self, expected: U) -> Result<(), AssertionError>
    where
        T: PartialEq<U> + Debug,
        U: Debug,
    {
        self.verdict(
            "received",
            "to_be",
            *self.actual == expected,
            || format!("{:?}", expected),
            || format!("{:?}", self.actual),
        )
    }

    /// Deep equality; nested collections compare element by element.
    pub fn to_equal<U>(&self, expected: U) -> Result<(), AssertionError>
    where
        T: PartialEq<U> + Debug,
        U: Debug,
    {
        self.verdict(
            "received",
            "to_equal",
            *self.actual == expected,
            || format!("{:#?}", expected),
            || format!("{:#?}", self.actual),
        )
    }

    pub fn to_have_length(&self, expected: usize) -> Result<(), AssertionError>
    where
        T: Length,
    {
        let actual = self.actual.length();
        self.verdict(
            "received",
            "to_have_length",
            actual == expected,
            || format!("length {}", expected),
            || format!("length {}", actual),
        )
    }

    /// Compare against the stored snapshot for the current test.
    ///
    /// The first snapshot of a test is keyed `"<test name> 1"`, the second
    /// `"<test name> 2"`, and so on. A missing baseline is recorded unless
    /// the store is in CI mode.
    pub fn to_match_snapshot(&self, cx: &TestContext) -> Result<(), AssertionError>
    where
        T: Serialize,
    {
        let key = cx.next_snapshot_key();
        if self.negated {
            return Err(AssertionError {
                subject: "received".to_string(),
                matcher: "not.to_match_snapshot".to_string(),
                expected: "a non-negated snapshot matcher".to_string(),
                actual: "negation".to_string(),
            });
        }
        let actual = structural::serialize(self.actual, "to_match_snapshot")?;
        match cx.check_snapshot(&key, actual.clone()) {
            SnapshotOutcome::Matched | SnapshotOutcome::Written | SnapshotOutcome::Updated => {
                Ok(())
            }
            SnapshotOutcome::Mismatch { expected } => Err(AssertionError {
                subject: "received".to_string(),
                matcher: "to_match_snapshot".to_string(),
                expected: format!("snapshot `{}` = {}", key, pretty(&expected)),
                actual: pretty(&actual),
            }),
            SnapshotOutcome::Missing => Err(AssertionError {
                subject: "received".to_string(),
                matcher: "to_match_snapshot".to_string(),
                expected: format!("stored snapshot `{}` (not written in CI mode)", key),
                actual: pretty(&actual),
            }),
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Things with a length.
pub trait Length {
    fn length(&self) -> usize;
}

impl<T> Length for [T] {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T, const N: usize> Length for [T; N] {
    fn length(&self) -> usize {
        N
    }
}

impl<T> Length for Vec<T> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<T> Length for VecDeque<T> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl Length for str {
    /// Length in characters, not bytes.
    fn length(&self) -> usize {
        self.chars().count()
    }
}

impl Length for String {
    fn length(&self) -> usize {
        self.as_str().length()
    }
}

impl<K, V, S> Length for HashMap<K, V, S> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, V> Length for BTreeMap<K, V> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<L: Length + ?Sized> Length for &L {
    fn length(&self) -> usize {
        (**self).length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_be_and_to_equal() {
        assert!(expect(&"I am a mock function").to_be("I am a mock function").is_ok());
        assert!(expect(&String::from("abc")).to_be("abc").is_ok());
        assert!(expect(&vec![vec![1, 2], vec![3]]).to_equal(vec![vec![1, 2], vec![3]]).is_ok());

        let err = expect(&1).to_be(2).unwrap_err();
        assert_eq!(err.matcher, "to_be");
        assert_eq!(err.expected, "2");
        assert_eq!(err.actual, "1");
    }

    #[test]
    fn test_negation() {
        assert!(expect(&1).not().to_be(2).is_ok());
        let err = expect(&1).not().to_be(1).unwrap_err();
        assert_eq!(err.matcher, "not.to_be");
        assert_eq!(err.expected, "not 1");
        // double negation cancels out
        assert!(expect(&1).not().not().to_be(1).is_ok());
    }

    #[test]
    fn test_to_have_length() {
        let items: &[u8] = &[1, 2, 3, 4];
        assert!(expect(items).to_have_length(4).is_ok());
        assert!(expect(&vec!["a"]).to_have_length(1).is_ok());
        assert!(expect("pizza").to_have_length(5).is_ok());
        assert!(expect(&[0; 3]).to_have_length(3).is_ok());

        let err = expect(items).to_have_length(3).unwrap_err();
        assert_eq!(err.expected, "length 3");
        assert_eq!(err.actual, "length 4");
    }

    #[test]
    fn test_error_display() {
        let err = expect(&"a").to_be("b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expect(received).to_be: expected \"b\", received \"a\""
        );
    }
}
