//! Shared objects with named data and method properties.
//!
//! Methods are stored type-erased so one object can hold methods of
//! different signatures. Lookups check the signature at call time.

use serde_json::Value;
use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use thiserror::Error;

use super::MockFn;

/// A method property. The first argument is the receiver.
pub type Method<A, R> = Arc<dyn Fn(&Object, A) -> R + Send + Sync>;

/// Errors from looking up or replacing a property.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTargetError {
    #[error("property `{property}` does not exist")]
    MissingProperty { property: String },
    #[error("property `{property}` is not callable")]
    NotCallable { property: String },
    #[error("method `{property}` has signature {actual}, not {requested}")]
    SignatureMismatch {
        property: String,
        requested: &'static str,
        actual: &'static str,
    },
}

/// Type-erased method with its signature name.
#[derive(Clone)]
pub(crate) struct MethodSlot {
    pub(crate) method: Arc<dyn Any + Send + Sync>,
    pub(crate) signature: &'static str,
}

impl MethodSlot {
    fn new<A: 'static, R: 'static>(method: Method<A, R>) -> Self {
        Self {
            method: Arc::new(method),
            signature: signature::<A, R>(),
        }
    }
}

#[derive(Clone)]
enum Property {
    Data(Value),
    Method(MethodSlot),
}

fn signature<A, R>() -> &'static str {
    type_name::<fn(A) -> R>()
}

/// A cheap-clone handle to a shared property map.
#[derive(Clone, Default)]
pub struct Object {
    props: Arc<RwLock<BTreeMap<String, Property>>>,
}

/// Non-owning handle to an [`Object`].
#[derive(Clone)]
pub struct WeakObject {
    props: Weak<RwLock<BTreeMap<String, Property>>>,
}

impl WeakObject {
    pub fn upgrade(&self) -> Option<Object> {
        self.props.upgrade().map(|props| Object { props })
    }
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Property>> {
        self.props.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Property>> {
        self.props.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builder form of [`set_data`](Self::set_data).
    pub fn with_data(self, name: impl Into<String>, value: Value) -> Self {
        self.set_data(name, value);
        self
    }

    /// Builder form of [`set_method`](Self::set_method).
    pub fn with_method<A, R, F>(self, name: impl Into<String>, method: F) -> Self
    where
        A: 'static,
        R: 'static,
        F: Fn(&Object, A) -> R + Send + Sync + 'static,
    {
        self.set_method(name, method);
        self
    }

    /// Install a method that forwards to `mock`.
    pub fn with_mock<A, R>(self, name: impl Into<String>, mock: &MockFn<A, R>) -> Self
    where
        A: Clone + Send + 'static,
        R: Clone + Send + 'static,
    {
        let mock = mock.clone();
        self.with_method(name, move |_: &Object, args: A| mock.call(args))
    }

    pub fn set_data(&self, name: impl Into<String>, value: Value) {
        self.write().insert(name.into(), Property::Data(value));
    }

    pub fn set_method<A, R, F>(&self, name: impl Into<String>, method: F)
    where
        A: 'static,
        R: 'static,
        F: Fn(&Object, A) -> R + Send + Sync + 'static,
    {
        let method: Method<A, R> = Arc::new(method);
        self.write()
            .insert(name.into(), Property::Method(MethodSlot::new(method)));
    }

    pub fn has(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Property names in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Value of a data property.
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.read().get(name) {
            Some(Property::Data(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Typed handle to a method property.
    pub fn method<A: 'static, R: 'static>(
        &self,
        name: &str,
    ) -> Result<Method<A, R>, InvalidTargetError> {
        let slot = self.method_slot(name)?;
        downcast::<A, R>(name, &slot)
    }

    /// Look up and invoke a method with `self` as receiver.
    ///
    /// `A` and `R` must be exactly the types the method was installed with.
    /// An unsuffixed integer literal is `i32`, so a `u32` method needs
    /// `12_u32`, not `12`.
    ///
    /// The property lock is not held while the method runs, so a method may
    /// read or replace properties of its own receiver.
    pub fn call<A: 'static, R: 'static>(
        &self,
        name: &str,
        args: A,
    ) -> Result<R, InvalidTargetError> {
        let method = self.method::<A, R>(name)?;
        Ok(method(self, args))
    }

    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            props: Arc::downgrade(&self.props),
        }
    }

    pub(crate) fn method_slot(&self, name: &str) -> Result<MethodSlot, InvalidTargetError> {
        match self.read().get(name) {
            Some(Property::Method(slot)) => Ok(slot.clone()),
            Some(Property::Data(_)) => Err(InvalidTargetError::NotCallable {
                property: name.to_string(),
            }),
            None => Err(InvalidTargetError::MissingProperty {
                property: name.to_string(),
            }),
        }
    }

    /// Replace a method property, returning the previous slot.
    ///
    /// Fails without modifying the object if the property is missing, is data,
    /// or holds a method of a different signature.
    pub(crate) fn swap_method<A: 'static, R: 'static>(
        &self,
        name: &str,
        method: Method<A, R>,
    ) -> Result<MethodSlot, InvalidTargetError> {
        let mut props = self.write();
        let previous = match props.get(name) {
            Some(Property::Method(slot)) => slot.clone(),
            Some(Property::Data(_)) => {
                return Err(InvalidTargetError::NotCallable {
                    property: name.to_string(),
                })
            }
            None => {
                return Err(InvalidTargetError::MissingProperty {
                    property: name.to_string(),
                })
            }
        };
        downcast::<A, R>(name, &previous)?;
        props.insert(name.to_string(), Property::Method(MethodSlot::new(method)));
        Ok(previous)
    }

    /// Put a previously captured slot back verbatim.
    pub(crate) fn restore_slot(&self, name: &str, slot: MethodSlot) {
        self.write().insert(name.to_string(), Property::Method(slot));
    }
}

fn downcast<A: 'static, R: 'static>(
    name: &str,
    slot: &MethodSlot,
) -> Result<Method<A, R>, InvalidTargetError> {
    slot.method
        .downcast_ref::<Method<A, R>>()
        .cloned()
        .ok_or_else(|| InvalidTargetError::SignatureMismatch {
            property: name.to_string(),
            requested: signature::<A, R>(),
            actual: slot.signature,
        })
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let props = self.read();
        let mut map = f.debug_map();
        for (name, prop) in props.iter() {
            match prop {
                Property::Data(value) => map.entry(name, value),
                Property::Method(slot) => map.entry(name, &format_args!("[method {}]", slot.signature)),
            };
        }
        map.finish()
    }
}
