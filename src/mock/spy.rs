//! Spies: mock functions installed over an object's method.

use std::ops::Deref;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use super::object::MethodSlot;
use super::{InvalidTargetError, Method, MockFn, Object, Tracked, WeakObject};

/// Target, property and the original method a spy replaced.
struct Binding {
    target: WeakObject,
    property: String,
    original: MethodSlot,
}

/// A [`MockFn`] standing in for an object's method until restored.
///
/// Dereferences to the underlying mock, so every configuration and
/// introspection method of [`MockFn`] is available on the spy.
pub struct Spy<A, R> {
    mock: MockFn<A, R>,
    binding: Mutex<Option<Binding>>,
}

/// Replace `object.property` with a spy that forwards to the original.
///
/// The original keeps its receiver: it runs against `object` unless the spy
/// is given another implementation.
pub fn spy_on<A, R>(object: &Object, property: &str) -> Result<Spy<A, R>, InvalidTargetError>
where
    A: Clone + Send + 'static,
    R: Clone + Send + 'static,
{
    let original: Method<A, R> = object.method(property)?;
    let receiver = object.downgrade();
    let mock = MockFn::with_impl(move |args: A| match receiver.upgrade() {
        Some(this) => original(&this, args),
        // The object is gone; the method still runs, against an empty receiver.
        None => original(&Object::new(), args),
    });

    let installed = mock.clone();
    let replacement: Method<A, R> = Arc::new(move |_: &Object, args: A| installed.call(args));
    let original = object.swap_method(property, replacement)?;
    debug!(property, "spy installed");

    Ok(Spy {
        mock,
        binding: Mutex::new(Some(Binding {
            target: object.downgrade(),
            property: property.to_string(),
            original,
        })),
    })
}

impl<A: 'static, R: 'static> Spy<A, R> {
    /// Put the original method back and reset the spy.
    ///
    /// Calling this more than once is a no-op.
    pub fn mock_restore(&self) {
        let binding = self
            .binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(binding) = binding {
            // A dropped target has nothing left to restore.
            if let Some(target) = binding.target.upgrade() {
                target.restore_slot(&binding.property, binding.original);
            }
            self.mock.mock_reset();
            debug!(property = %binding.property, "spy restored");
        }
    }

    /// Whether the spy is still installed on its target.
    pub fn is_active(&self) -> bool {
        self.binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<A, R> Deref for Spy<A, R> {
    type Target = MockFn<A, R>;

    fn deref(&self) -> &MockFn<A, R> {
        &self.mock
    }
}

impl<A, R> Tracked for Spy<A, R> {
    type Args = A;
    type Output = R;

    fn mock(&self) -> &MockFn<A, R> {
        &self.mock
    }
}

impl<A, R> std::fmt::Debug for Spy<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let property = self
            .binding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|b| b.property.clone());
        f.debug_struct("Spy")
            .field("property", &property)
            .field("mock", &self.mock)
            .finish()
    }
}
