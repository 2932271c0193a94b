use std::cell::{Cell, RefCell};

use crate::error::RenderError;
use crate::runtime::{Instance, WeakInstance, current_instance};
use crate::view::View;

/// Catches a failed render of its content and shows a fallback instead.
///
/// The content runs in a child instance. When it fails, that instance is
/// unmounted; the boundary stays in the error state until one of its reset
/// keys changes or [`ErrorBoundary::reset`] is called, which mounts a fresh
/// child.
pub struct ErrorBoundary<K: PartialEq + 'static> {
    name: String,
    parent: Option<WeakInstance>,
    child: RefCell<Instance>,
    error: RefCell<Option<RenderError>>,
    reset_keys: RefCell<Option<K>>,
    resets: Cell<u64>,
}

impl<K: PartialEq + 'static> ErrorBoundary<K> {
    /// The boundary's content becomes a child of the instance being composed, if any.
    pub fn new(content_name: impl Into<String>) -> Self {
        Self::build(content_name.into(), current_instance())
    }

    /// A boundary whose content is a child of `parent`.
    pub fn within(parent: &Instance, content_name: impl Into<String>) -> Self {
        Self::build(content_name.into(), Some(parent.clone()))
    }

    fn build(name: String, parent: Option<Instance>) -> Self {
        let child = Self::mount_child(parent.as_ref(), &name);
        Self {
            name,
            parent: parent.map(|p| p.downgrade()),
            child: RefCell::new(child),
            error: RefCell::new(None),
            reset_keys: RefCell::new(None),
            resets: Cell::new(0),
        }
    }

    fn mount_child(parent: Option<&Instance>, name: &str) -> Instance {
        match parent {
            Some(parent) => parent.child(name),
            None => Instance::new(name),
        }
    }

    pub fn render(&self, reset_keys: K, content: impl FnOnce() -> Result<View, RenderError>) -> View {
        let keys_changed = self.reset_keys.borrow().as_ref() != Some(&reset_keys);
        if keys_changed {
            *self.reset_keys.borrow_mut() = Some(reset_keys);
            if self.error.borrow().is_some() {
                log::debug!("boundary '{}': reset keys changed", self.name);
                self.reset();
            }
        }

        if let Some(error) = self.error.borrow().as_ref() {
            return fallback(error);
        }

        let child = self.child.borrow().clone();
        match child.compose(content) {
            Ok(view) => view,
            Err(error) => {
                log::warn!("boundary '{}': caught {error}", self.name);
                child.unmount();
                let view = fallback(&error);
                *self.error.borrow_mut() = Some(error);
                view
            }
        }
    }

    /// Clears the error and mounts fresh content.
    pub fn reset(&self) {
        *self.error.borrow_mut() = None;
        let parent = self.parent.as_ref().and_then(WeakInstance::upgrade);
        let fresh = Self::mount_child(parent.as_ref(), &self.name);
        let old = self.child.replace(fresh);
        old.unmount();
        self.resets.set(self.resets.get() + 1);
        if let Some(parent) = parent {
            parent.invalidate();
        }
    }

    pub fn error(&self) -> Option<RenderError> {
        self.error.borrow().clone()
    }

    pub fn child(&self) -> Instance {
        self.child.borrow().clone()
    }

    pub fn resets(&self) -> u64 {
        self.resets.get()
    }
}

fn fallback(error: &RenderError) -> View {
    View::Column(vec![
        View::Error {
            message: error.to_string(),
        },
        View::button("Try again"),
    ])
}
