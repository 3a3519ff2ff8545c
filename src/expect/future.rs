//! Matchers that await a future and branch on how it settled.

use regex::Regex;
use std::fmt::{Debug, Display};
use std::future::Future;

use super::AssertionError;

/// A future under test. Consumed by the matcher that awaits it.
pub struct FutureExpectation<F> {
    future: F,
}

/// Start an expectation on a future yielding `Result<T, E>`.
pub fn expect_future<F>(future: F) -> FutureExpectation<F> {
    FutureExpectation { future }
}

fn failure(matcher: &str, expected: String, actual: String) -> AssertionError {
    AssertionError {
        subject: "promise".to_string(),
        matcher: matcher.to_string(),
        expected,
        actual,
    }
}

impl<F, T, E> FutureExpectation<F>
where
    F: Future<Output = Result<T, E>>,
    T: Debug,
    E: Display,
{
    /// Await a resolution and hand back the value.
    pub async fn resolves(self) -> Result<T, AssertionError> {
        match self.future.await {
            Ok(value) => Ok(value),
            Err(e) => Err(failure(
                "resolves",
                "a resolved promise".to_string(),
                format!("rejected with \"{}\"", e),
            )),
        }
    }

    /// Await a rejection and hand back the error.
    pub async fn rejects(self) -> Result<E, AssertionError> {
        match self.future.await {
            Ok(value) => Err(failure(
                "rejects",
                "a rejected promise".to_string(),
                format!("resolved to {:?}", value),
            )),
            Err(e) => Ok(e),
        }
    }

    pub async fn resolves_to<U>(self, expected: U) -> Result<(), AssertionError>
    where
        T: PartialEq<U>,
        U: Debug,
    {
        let value = self.resolves().await?;
        if value == expected {
            Ok(())
        } else {
            Err(failure(
                "resolves.to_be",
                format!("{:?}", expected),
                format!("{:?}", value),
            ))
        }
    }

    /// Rejected with an error whose message contains `substring`.
    pub async fn rejects_with(self, substring: &str) -> Result<(), AssertionError> {
        let message = self.rejects().await?.to_string();
        if message.contains(substring) {
            Ok(())
        } else {
            Err(failure(
                "rejects.to_throw",
                format!("message containing \"{}\"", substring),
                format!("\"{}\"", message),
            ))
        }
    }

    /// Rejected with an error whose message matches `pattern`.
    pub async fn rejects_matching(self, pattern: &Regex) -> Result<(), AssertionError> {
        let message = self.rejects().await?.to_string();
        if pattern.is_match(&message) {
            Ok(())
        } else {
            Err(failure(
                "rejects.to_throw",
                format!("message matching /{}/", pattern),
                format!("\"{}\"", message),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{reject, resolve, MockFn, Promise};

    #[tokio::test]
    async fn test_resolves_to() {
        let get_full_name =
            MockFn::with_impl(|_: String| resolve("Karl Hadwen".to_string()));
        let promise = get_full_name.call("Karl Hadwen".to_string());
        assert!(expect_future(promise).resolves_to("Karl Hadwen").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolves_to_fails_on_rejection_or_other_value() {
        let err = expect_future(reject::<String>("boom"))
            .resolves_to("x")
            .await
            .unwrap_err();
        assert_eq!(err.matcher, "resolves");
        assert!(err.actual.contains("boom"));

        let err = expect_future(resolve("y".to_string()))
            .resolves_to("x")
            .await
            .unwrap_err();
        assert_eq!(err.matcher, "resolves.to_be");
    }

    #[tokio::test]
    async fn test_rejects_with() {
        let failing: MockFn<String, Promise<String>> = MockFn::with_impl(|_| reject("unused"));
        failing.mock_rejected_value("Something went wrong");
        let promise = failing.call("Karl Hadwen".to_string());

        assert!(expect_future(promise.clone())
            .rejects_with("Something went wrong")
            .await
            .is_ok());
        assert!(expect_future(promise.clone())
            .rejects_with("went")
            .await
            .is_ok());
        assert!(expect_future(promise).rejects_with("other").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_fails_on_resolution() {
        let err = expect_future(resolve(1_u8))
            .rejects_with("anything")
            .await
            .unwrap_err();
        assert_eq!(err.matcher, "rejects");
        assert_eq!(err.actual, "resolved to 1");
    }

    #[tokio::test]
    async fn test_rejects_matching() {
        let pattern = Regex::new(r"went\s+wrong$").unwrap();
        assert!(expect_future(reject::<()>("Something went wrong"))
            .rejects_matching(&pattern)
            .await
            .is_ok());
        assert!(expect_future(reject::<()>("fine"))
            .rejects_matching(&pattern)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_plain_result_futures() {
        let ok = async { Ok::<_, std::io::Error>(5) };
        assert_eq!(expect_future(ok).resolves().await.unwrap(), 5);
    }
}
