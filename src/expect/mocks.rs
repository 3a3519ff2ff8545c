//! Call-history matchers for mocks and spies.

use std::fmt::Debug;

use super::{AssertionError, Expectation};
use crate::mock::Tracked;

fn describe_calls<A: Debug>(calls: &[A]) -> String {
    if calls.is_empty() {
        return "no calls".to_string();
    }
    let rendered: Vec<String> = calls
        .iter()
        .enumerate()
        .map(|(i, args)| format!("#{}: {:?}", i + 1, args))
        .collect();
    rendered.join(", ")
}

impl<'a, M> Expectation<'a, M>
where
    M: Tracked,
    M::Args: Clone + PartialEq + Debug + 'static,
    M::Output: Clone + PartialEq + Debug + 'static,
{
    fn args(&self) -> Vec<M::Args> {
        self.actual
            .mock()
            .calls()
            .into_iter()
            .map(|c| c.args)
            .collect()
    }

    fn name(&self) -> String {
        self.actual.mock().get_mock_name()
    }

    pub fn to_have_been_called(&self) -> Result<(), AssertionError> {
        let count = self.actual.mock().call_count();
        self.verdict(
            self.name(),
            "to_have_been_called",
            count > 0,
            || "at least one call".to_string(),
            || format!("{} calls", count),
        )
    }

    /// Exact number of calls.
    pub fn to_have_been_called_times(&self, expected: usize) -> Result<(), AssertionError> {
        let count = self.actual.mock().call_count();
        self.verdict(
            self.name(),
            "to_have_been_called_times",
            count == expected,
            || format!("{} calls", expected),
            || format!("{} calls", count),
        )
    }

    /// At least one call had exactly these arguments.
    pub fn to_have_been_called_with(&self, expected: M::Args) -> Result<(), AssertionError> {
        let calls = self.args();
        self.verdict(
            self.name(),
            "to_have_been_called_with",
            calls.iter().any(|args| *args == expected),
            || format!("{:?}", expected),
            || describe_calls(&calls),
        )
    }

    pub fn to_have_been_last_called_with(&self, expected: M::Args) -> Result<(), AssertionError> {
        let last = self.actual.mock().last_call_args();
        self.verdict(
            self.name(),
            "to_have_been_last_called_with",
            last.as_ref() == Some(&expected),
            || format!("{:?}", expected),
            || match &last {
                Some(args) => format!("{:?}", args),
                None => "no calls".to_string(),
            },
        )
    }

    /// The `nth` call (1-based) had exactly these arguments.
    pub fn to_have_been_nth_called_with(
        &self,
        nth: usize,
        expected: M::Args,
    ) -> Result<(), AssertionError> {
        let call = nth
            .checked_sub(1)
            .and_then(|i| self.actual.mock().call_args(i));
        self.verdict(
            self.name(),
            "to_have_been_nth_called_with",
            call.as_ref() == Some(&expected),
            || format!("call #{} with {:?}", nth, expected),
            || match &call {
                Some(args) => format!("call #{} with {:?}", nth, args),
                None => format!("no call #{}", nth),
            },
        )
    }

    /// The most recent call returned `expected`.
    pub fn to_have_last_returned_with(&self, expected: M::Output) -> Result<(), AssertionError> {
        let last = self.actual.mock().last_result();
        self.verdict(
            self.name(),
            "to_have_last_returned_with",
            last.as_ref() == Some(&expected),
            || format!("{:?}", expected),
            || match &last {
                Some(value) => format!("{:?}", value),
                None => "no return value".to_string(),
            },
        )
    }

    /// Number of calls that returned a value.
    pub fn to_have_returned_times(&self, expected: usize) -> Result<(), AssertionError> {
        let count = self.actual.mock().results().len();
        self.verdict(
            self.name(),
            "to_have_returned_times",
            count == expected,
            || format!("{} returns", expected),
            || format!("{} returns", count),
        )
    }
}
