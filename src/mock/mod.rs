//! Test doubles: mock functions, shared objects and spies.
//!
//! A [`MockFn`] is a cheap-clone handle around shared state, so a clone can
//! be moved into an [`Object`] method or a closure while the test keeps the
//! original for assertions. Multiple arguments are passed as a tuple or a
//! `Vec` (`A`), and "no value" is modelled by `R::default()`.

mod object;
mod promise;
mod spy;

pub use object::{InvalidTargetError, Method, Object, WeakObject};
pub use promise::{reject, resolve, Promise, Rejection};
pub use spy::{spy_on, Spy};

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Process-wide invocation counter, so calls can be ordered across mocks.
static INVOCATION_ORDER: AtomicUsize = AtomicUsize::new(1);

/// A replaceable mock behavior.
pub type Implementation<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call<A, R> {
    pub args: A,
    /// `None` while the call is still running or if the implementation panicked.
    pub result: Option<R>,
    /// Global invocation order, starting at 1.
    pub order: usize,
}

enum OneShot<A, R> {
    Value(R),
    Implementation(Implementation<A, R>),
}

struct MockState<A, R> {
    name: Option<String>,
    calls: Vec<Call<A, R>>,
    once: VecDeque<OneShot<A, R>>,
    implementation: Implementation<A, R>,
    fallback: Implementation<A, R>,
}

/// A callable that records every invocation.
pub struct MockFn<A, R> {
    state: Arc<Mutex<MockState<A, R>>>,
}

impl<A, R> Clone for MockFn<A, R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: 'static, R: Default + 'static> Default for MockFn<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static, R: Default + 'static> MockFn<A, R> {
    /// Create a mock whose default implementation returns `R::default()`.
    pub fn new() -> Self {
        Self::with_impl(|_| R::default())
    }
}

impl<A: 'static, R: 'static> MockFn<A, R> {
    /// Create a mock with the given default implementation.
    ///
    /// [`mock_reset`](Self::mock_reset) returns to this implementation.
    pub fn with_impl<F>(implementation: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let implementation: Implementation<A, R> = Arc::new(implementation);
        Self {
            state: Arc::new(Mutex::new(MockState {
                name: None,
                calls: Vec::new(),
                once: VecDeque::new(),
                implementation: Arc::clone(&implementation),
                fallback: implementation,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState<A, R>> {
        // A panicking test body may poison the lock; the state is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Name shown in assertion messages.
    pub fn mock_name(&self, name: impl Into<String>) -> &Self {
        self.lock().name = Some(name.into());
        self
    }

    pub fn get_mock_name(&self) -> String {
        self.lock()
            .name
            .clone()
            .unwrap_or_else(|| "mock function".to_string())
    }

    /// Queue a value returned by exactly one future call.
    pub fn mock_return_value_once(&self, value: R) -> &Self {
        self.lock().once.push_back(OneShot::Value(value));
        self
    }

    /// Queue an implementation used by exactly one future call.
    pub fn mock_implementation_once<F>(&self, implementation: F) -> &Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.lock()
            .once
            .push_back(OneShot::Implementation(Arc::new(implementation)));
        self
    }

    /// Replace the bound implementation.
    pub fn mock_implementation<F>(&self, implementation: F) -> &Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        self.lock().implementation = Arc::new(implementation);
        self
    }

    /// Bind an implementation that always returns `value`.
    pub fn mock_return_value(&self, value: R) -> &Self
    where
        R: Clone + Send + Sync,
    {
        self.mock_implementation(move |_| value.clone())
    }

    /// Forget recorded calls. Configured behavior is kept.
    pub fn mock_clear(&self) -> &Self {
        self.lock().calls.clear();
        self
    }

    /// Forget recorded calls, queued values and the bound implementation.
    pub fn mock_reset(&self) -> &Self {
        let mut state = self.lock();
        state.calls.clear();
        state.once.clear();
        state.implementation = Arc::clone(&state.fallback);
        drop(state);
        self
    }

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }
}

impl<A: Clone + 'static, R: Clone + 'static> MockFn<A, R> {
    /// Invoke the mock.
    ///
    /// Queued one-shot behaviors are consumed first, in FIFO order; otherwise
    /// the bound implementation runs. The lock is released while the
    /// implementation runs, so it may call back into this mock.
    pub fn call(&self, args: A) -> R {
        let (order, behavior) = {
            let mut state = self.lock();
            let order = INVOCATION_ORDER.fetch_add(1, Ordering::Relaxed);
            state.calls.push(Call {
                args: args.clone(),
                result: None,
                order,
            });
            let behavior = match state.once.pop_front() {
                Some(one_shot) => one_shot,
                None => OneShot::Implementation(Arc::clone(&state.implementation)),
            };
            (order, behavior)
        };

        let result = match behavior {
            OneShot::Value(value) => value,
            OneShot::Implementation(implementation) => implementation(args),
        };

        let mut state = self.lock();
        // mock_clear may have run inside the implementation
        if let Some(call) = state.calls.iter_mut().rev().find(|c| c.order == order) {
            call.result = Some(result.clone());
        }
        result
    }

    /// Snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<Call<A, R>> {
        self.lock().calls.clone()
    }

    /// Arguments of the call at `index` (0-based).
    pub fn call_args(&self, index: usize) -> Option<A> {
        self.lock().calls.get(index).map(|c| c.args.clone())
    }

    pub fn last_call_args(&self) -> Option<A> {
        self.lock().calls.last().map(|c| c.args.clone())
    }

    /// Values returned so far, in call order. Unfinished calls are skipped.
    pub fn results(&self) -> Vec<R> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| c.result.clone())
            .collect()
    }

    pub fn last_result(&self) -> Option<R> {
        self.lock().calls.last().and_then(|c| c.result.clone())
    }

    /// Global invocation order of each call.
    pub fn invocation_order(&self) -> Vec<usize> {
        self.lock().calls.iter().map(|c| c.order).collect()
    }
}

impl<A: 'static, T: Clone + Send + Sync + 'static> MockFn<A, Promise<T>> {
    /// Bind an implementation returning an already-resolved promise.
    pub fn mock_resolved_value(&self, value: T) -> &Self {
        self.mock_implementation(move |_| resolve(value.clone()))
    }

    /// Bind an implementation returning an already-rejected promise.
    pub fn mock_rejected_value(&self, message: impl Into<String>) -> &Self {
        let message = message.into();
        self.mock_implementation(move |_| reject(message.clone()))
    }
}

impl<A, R> fmt::Debug for MockFn<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MockFn")
            .field("name", &state.name)
            .field("calls", &state.calls.len())
            .field("queued", &state.once.len())
            .finish()
    }
}

/// Anything whose invocations can be asserted on.
pub trait Tracked {
    type Args;
    type Output;

    fn mock(&self) -> &MockFn<Self::Args, Self::Output>;
}

impl<A, R> Tracked for MockFn<A, R> {
    type Args = A;
    type Output = R;

    fn mock(&self) -> &MockFn<A, R> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_returns_default_value() {
        let mock: MockFn<(), Option<&str>> = MockFn::new();
        assert_eq!(mock.call(()), None);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn test_once_values_are_fifo_then_fallback() {
        let mock = MockFn::with_impl(|_: ()| "default");
        mock.mock_return_value_once("Hello")
            .mock_return_value_once("there!");

        assert_eq!(mock.call(()), "Hello");
        assert_eq!(mock.call(()), "there!");
        assert_eq!(mock.call(()), "default");
        assert_eq!(mock.results(), vec!["Hello", "there!", "default"]);
    }

    #[test]
    fn test_once_value_skips_implementation() {
        let inner: MockFn<u32, u32> = MockFn::new();
        let counter = inner.clone();
        let mock = MockFn::with_impl(move |n: u32| counter.call(n));
        mock.mock_return_value_once(7);

        assert_eq!(mock.call(1), 7);
        assert_eq!(inner.call_count(), 0);
        mock.call(2);
        assert_eq!(inner.call_count(), 1);
    }

    #[test]
    fn test_implementation_once_precedes_bound_implementation() {
        let mock = MockFn::with_impl(|n: i32| n);
        mock.mock_implementation_once(|n| n * 10);
        assert_eq!(mock.call(2), 20);
        assert_eq!(mock.call(2), 2);
    }

    #[test]
    fn test_mock_return_value_is_permanent() {
        let mock: MockFn<(), &str> = MockFn::new();
        mock.mock_return_value("United Kingdom");
        assert_eq!(mock.call(()), "United Kingdom");
        assert_eq!(mock.call(()), "United Kingdom");
    }

    #[test]
    fn test_call_args_and_last_call() {
        let mock: MockFn<Vec<&str>, ()> = MockFn::new();
        mock.call(vec![]);
        mock.call(vec!["Hello", "there", "Steve"]);
        mock.call(vec!["Steve"]);

        assert_eq!(mock.call_count(), 3);
        assert_eq!(mock.call_args(1), Some(vec!["Hello", "there", "Steve"]));
        assert_eq!(mock.last_call_args(), Some(vec!["Steve"]));
        assert_eq!(mock.call_args(5), None);
    }

    #[test]
    fn test_clear_keeps_behavior_reset_drops_it() {
        let mock = MockFn::with_impl(|_: ()| 1);
        mock.mock_implementation(|_| 2).mock_return_value_once(3);
        mock.call(());

        mock.mock_clear();
        assert_eq!(mock.call_count(), 0);
        assert_eq!(mock.call(()), 2);

        mock.mock_return_value_once(3).mock_reset();
        assert_eq!(mock.call_count(), 0);
        assert_eq!(mock.call(()), 1);
    }

    #[test]
    fn test_invocation_order_across_mocks() {
        let first: MockFn<(), ()> = MockFn::new();
        let second: MockFn<(), ()> = MockFn::new();
        first.call(());
        second.call(());
        first.call(());

        let a = first.invocation_order();
        let b = second.invocation_order();
        assert!(a[0] < b[0]);
        assert!(b[0] < a[1]);
    }

    #[test]
    fn test_reentrant_implementation() {
        let mock: MockFn<u32, u32> = MockFn::new();
        let handle = mock.clone();
        mock.mock_implementation(move |n| if n == 0 { 0 } else { handle.call(n - 1) + 1 });

        assert_eq!(mock.call(3), 3);
        assert_eq!(mock.call_count(), 4);
        // results follow call order, not completion order
        assert_eq!(mock.results(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_mock_name() {
        let mock: MockFn<(), ()> = MockFn::new();
        assert_eq!(mock.get_mock_name(), "mock function");
        mock.mock_name("getFullName");
        assert_eq!(mock.get_mock_name(), "getFullName");
    }
}
