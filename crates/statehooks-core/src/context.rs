//! # Scoped shared values
//!
//! A [`Provider`] owns one shared value for the lifetime of its scope. Anything
//! composed inside [`Provider::provide`] can read it with [`use_context`]:
//!
//! ```rust
//! use statehooks_core::*;
//!
//! struct Greeting(&'static str);
//!
//! let provider = Provider::new(Greeting("hi"));
//! let instance = Instance::new("Consumer");
//! let seen = provider.provide(|| instance.compose(|| use_context::<Greeting>().map(|g| g.0)));
//! assert_eq!(seen, Ok("hi"));
//!
//! assert!(instance.compose(|| use_context::<Greeting>()).is_err());
//! ```
//!
//! Nested providers of the same type shadow outer ones. There is no global
//! default: asking outside every provider is an error.

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::HookError;
use crate::scope::Scope;

thread_local! {
    static PROVIDED: RefCell<Vec<(TypeId, Rc<dyn Any>)>> = const { RefCell::new(Vec::new()) };
}

/// Handle owning a shared value and the scope it lives in.
pub struct Provider<T: 'static> {
    value: Rc<T>,
    scope: Scope,
}

impl<T: 'static> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<T: 'static> Provider<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(value),
            scope: Scope::new(),
        }
    }

    /// A provider whose scope ends with `parent`.
    pub fn in_scope(parent: &Scope, value: T) -> Self {
        Self {
            value: Rc::new(value),
            scope: parent.child(),
        }
    }

    pub fn value(&self) -> Rc<T> {
        self.value.clone()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Makes the value visible to everything `f` composes.
    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        if !self.scope.is_live() {
            log::warn!("provider of {}: providing after teardown", type_name::<T>());
        }
        // pop on unwind too
        struct Guard;
        impl Drop for Guard {
            fn drop(&mut self) {
                PROVIDED.with(|p| {
                    p.borrow_mut().pop();
                });
            }
        }
        let value: Rc<dyn Any> = self.value.clone();
        PROVIDED.with(|p| p.borrow_mut().push((TypeId::of::<T>(), value)));
        let _guard = Guard;
        self.scope.run(f)
    }

    /// Ends the scope. Consumers still holding the value keep it alive.
    pub fn dispose(&self) {
        self.scope.dispose();
    }
}

/// Innermost provided `T`, if any.
pub fn try_use_context<T: 'static>() -> Option<Rc<T>> {
    PROVIDED.with(|p| {
        p.borrow()
            .iter()
            .rev()
            .find(|(id, _)| *id == TypeId::of::<T>())
            .and_then(|(_, v)| v.clone().downcast::<T>().ok())
    })
}

pub fn use_context<T: 'static>() -> Result<Rc<T>, HookError> {
    require_context("use_context", type_name::<T>())
}

/// Like [`use_context`], naming the hook and provider in the error.
pub fn require_context<T: 'static>(
    hook: &'static str,
    provider: &'static str,
) -> Result<Rc<T>, HookError> {
    try_use_context::<T>().ok_or_else(|| {
        log::error!("{hook} called outside of a {provider}");
        HookError::MissingProvider { hook, provider }
    })
}
