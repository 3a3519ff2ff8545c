//! Test registration.

use futures::future::{FutureExt, LocalBoxFuture};
use std::future::Future;

use super::{TestContext, TestError};

/// Separator between group and test names.
pub const GROUP_SEPARATOR: &str = " › ";

pub(crate) type SyncBody = Box<dyn Fn(&TestContext) -> Result<(), TestError>>;
pub(crate) type AsyncBody =
    Box<dyn Fn(TestContext) -> LocalBoxFuture<'static, Result<(), TestError>>>;

pub(crate) enum Body {
    Sync(SyncBody),
    Async(AsyncBody),
}

/// A registered test.
pub struct TestCase {
    pub(crate) name: String,
    pub(crate) body: Body,
}

impl TestCase {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_async(&self) -> bool {
        matches!(self.body, Body::Async(_))
    }
}

/// An ordered collection of test cases.
#[derive(Default)]
pub struct Suite {
    name: String,
    cases: Vec<TestCase>,
    groups: Vec<String>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn qualified(&self, name: String) -> String {
        if self.groups.is_empty() {
            return name;
        }
        let mut parts = self.groups.clone();
        parts.push(name);
        parts.join(GROUP_SEPARATOR)
    }

    /// Register a synchronous test.
    pub fn test<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(&TestContext) -> Result<(), TestError> + 'static,
    {
        let name = self.qualified(name.into());
        self.cases.push(TestCase {
            name,
            body: Body::Sync(Box::new(body)),
        });
        self
    }

    /// Register a test whose body is awaited to completion.
    pub fn test_async<F, Fut>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: Fn(TestContext) -> Fut + 'static,
        Fut: Future<Output = Result<(), TestError>> + 'static,
    {
        let name = self.qualified(name.into());
        self.cases.push(TestCase {
            name,
            body: Body::Async(Box::new(move |cx| body(cx).boxed_local())),
        });
        self
    }

    /// Register the tests added by `register` under a group name.
    pub fn describe<F>(&mut self, group: impl Into<String>, register: F) -> &mut Self
    where
        F: FnOnce(&mut Suite),
    {
        self.groups.push(group.into());
        register(self);
        self.groups.pop();
        self
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn names(&self) -> Vec<&str> {
        self.cases.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_and_groups() {
        let mut suite = Suite::new("menu");
        suite
            .test("first", |_| Ok(()))
            .describe("pizza", |s| {
                s.test("crust", |_| Ok(()));
                s.describe("toppings", |s| {
                    s.test_async("cheese", |_| async { Ok(()) });
                });
            })
            .test("last", |_| Ok(()));

        assert_eq!(
            suite.names(),
            vec![
                "first",
                "pizza › crust",
                "pizza › toppings › cheese",
                "last"
            ]
        );
        assert!(suite.cases()[2].is_async());
        assert!(!suite.cases()[0].is_async());
        assert_eq!(suite.len(), 4);
    }
}
