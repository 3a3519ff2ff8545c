//! Cloneable, already-settled futures for mocks of async functions.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;

/// The error a rejected [`Promise`] settles with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Rejection {
    message: String,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A shareable future settling to `Result<T, Rejection>`.
///
/// Clones observe the same settlement, which lets a mock record the promise
/// it returned while the caller awaits it.
pub struct Promise<T> {
    inner: Shared<BoxFuture<'static, Result<T, Rejection>>>,
}

impl<T: Clone + Send + Sync + 'static> Promise<T> {
    /// Wrap an arbitrary future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, Rejection>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }
}

impl<T> Clone for Promise<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Promise { .. }")
    }
}

impl<T> PartialEq for Promise<T> {
    /// Two handles are equal when they share the same underlying future.
    fn eq(&self, other: &Self) -> bool {
        self.inner.ptr_eq(&other.inner)
    }
}

impl<T: Clone> Future for Promise<T> {
    type Output = Result<T, Rejection>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

/// A promise that resolves to `value`.
pub fn resolve<T: Clone + Send + Sync + 'static>(value: T) -> Promise<T> {
    Promise::new(async move { Ok(value) })
}

/// A promise that rejects with `message`.
pub fn reject<T: Clone + Send + Sync + 'static>(message: impl Into<String>) -> Promise<T> {
    let rejection = Rejection::new(message);
    Promise::new(async move { Err(rejection) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve() {
        let promise = resolve("Karl Hadwen".to_string());
        assert_eq!(promise.await, Ok("Karl Hadwen".to_string()));
    }

    #[tokio::test]
    async fn test_reject() {
        let promise: Promise<String> = reject("Something went wrong");
        let err = promise.await.unwrap_err();
        assert_eq!(err.message(), "Something went wrong");
        assert_eq!(err.to_string(), "Something went wrong");
    }

    #[tokio::test]
    async fn test_clones_share_settlement() {
        let promise = resolve(3_u32);
        let copy = promise.clone();
        assert_eq!(promise, copy);
        assert_eq!(promise.await, Ok(3));
        assert_eq!(copy.await, Ok(3));
    }
}
