use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::scope::{Liveness, Scope};

thread_local! {
    static COMPOSING: RefCell<Vec<Instance>> = const { RefCell::new(Vec::new()) };
}

/// One logical component instance: a scope, a hook slot table and a dirty bit.
///
/// Hooks (`remember`, `use_reducer`, `use_effect`, ...) resolve against the
/// instance currently inside [`Instance::compose`]. Slots are order based, so
/// every pass must call the same hooks in the same order.
#[derive(Clone)]
pub struct Instance {
    inner: Rc<InstanceInner>,
}

struct InstanceInner {
    name: String,
    scope: Scope,
    parent: Option<Weak<InstanceInner>>,
    slots: RefCell<Vec<Box<dyn Any>>>,
    cursor: Cell<usize>,
    dirty: Cell<bool>,
    passes: Cell<u64>,
    after_pass: RefCell<Vec<Box<dyn FnOnce()>>>,
    debug_labels: RefCell<Vec<String>>,
}

/// Non-owning handle to an [`Instance`].
#[derive(Clone)]
pub struct WeakInstance(Weak<InstanceInner>);

impl WeakInstance {
    pub fn upgrade(&self) -> Option<Instance> {
        self.0.upgrade().map(|inner| Instance { inner })
    }
}

/// Weak handle that marks an instance (and its ancestors) for another pass.
#[derive(Clone)]
pub struct Invalidator(Weak<InstanceInner>);

impl Invalidator {
    pub fn invalidate(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.mark_dirty();
        }
    }
}

impl InstanceInner {
    fn mark_dirty(&self) {
        if !self.scope.is_live() {
            return;
        }
        self.dirty.set(true);
        let mut parent = self.parent.as_ref().and_then(Weak::upgrade);
        while let Some(p) = parent {
            p.dirty.set(true);
            parent = p.parent.as_ref().and_then(Weak::upgrade);
        }
    }
}

impl Instance {
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), Scope::new(), None)
    }

    /// A child instance, torn down together with `self`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self::build(
            name.into(),
            self.inner.scope.child(),
            Some(Rc::downgrade(&self.inner)),
        )
    }

    fn build(name: String, scope: Scope, parent: Option<Weak<InstanceInner>>) -> Self {
        log::trace!("instance '{name}': created");
        Self {
            inner: Rc::new(InstanceInner {
                name,
                scope,
                parent,
                slots: RefCell::new(Vec::new()),
                cursor: Cell::new(0),
                dirty: Cell::new(true),
                passes: Cell::new(0),
                after_pass: RefCell::new(Vec::new()),
                debug_labels: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    pub fn liveness(&self) -> Liveness {
        self.inner.scope.liveness()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.scope.is_live()
    }

    /// True when state changed since the last pass began.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    pub fn passes(&self) -> u64 {
        self.inner.passes.get()
    }

    pub fn invalidate(&self) {
        self.inner.mark_dirty();
    }

    pub fn downgrade(&self) -> WeakInstance {
        WeakInstance(Rc::downgrade(&self.inner))
    }

    pub fn invalidator(&self) -> Invalidator {
        Invalidator(Rc::downgrade(&self.inner))
    }

    /// Labels recorded by `use_debug_value` during the last pass.
    pub fn debug_labels(&self) -> Vec<String> {
        self.inner.debug_labels.borrow().clone()
    }

    /// Runs one render pass. Effects scheduled by the pass run after `f` returns.
    pub fn compose<R>(&self, f: impl FnOnce() -> R) -> R {
        if !self.is_mounted() {
            log::warn!("instance '{}': composing after unmount", self.name());
        }
        self.inner.cursor.set(0);
        self.inner.dirty.set(false);
        self.inner.passes.set(self.inner.passes.get() + 1);
        self.inner.debug_labels.borrow_mut().clear();

        let result = {
            struct Pop;
            impl Drop for Pop {
                fn drop(&mut self) {
                    COMPOSING.with(|c| {
                        c.borrow_mut().pop();
                    });
                }
            }
            COMPOSING.with(|c| c.borrow_mut().push(self.clone()));
            let _pop = Pop;
            self.inner.scope.run(f)
        };

        let effects = std::mem::take(&mut *self.inner.after_pass.borrow_mut());
        for effect in effects {
            if self.is_mounted() {
                effect();
            }
        }
        result
    }

    /// Tears the instance down: liveness goes false and every cleanup runs.
    pub fn unmount(&self) {
        log::trace!("instance '{}': unmount", self.name());
        self.inner.scope.dispose();
    }

    pub(crate) fn schedule_after_pass(&self, f: impl FnOnce() + 'static) {
        self.inner.after_pass.borrow_mut().push(Box::new(f));
    }

    pub(crate) fn push_debug_label(&self, label: String) {
        self.inner.debug_labels.borrow_mut().push(label);
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn remember_slot<T: 'static>(&self, init: impl FnOnce() -> T) -> Rc<T> {
        let cursor = self.inner.cursor.get();
        self.inner.cursor.set(cursor + 1);

        {
            let slots = self.inner.slots.borrow();
            if let Some(slot) = slots.get(cursor) {
                if let Some(rc) = slot.downcast_ref::<Rc<T>>() {
                    return rc.clone();
                }
                log::warn!(
                    "remember: slot {} of '{}' changed type; replacing. \
                     Hooks must be called in the same order on every pass.",
                    cursor,
                    self.name()
                );
            }
        }

        // init may itself call hooks; never hold the slot table across it
        let rc: Rc<T> = Rc::new(init());
        let mut slots = self.inner.slots.borrow_mut();
        if cursor < slots.len() {
            slots[cursor] = Box::new(rc.clone());
        } else {
            slots.push(Box::new(rc.clone()));
        }
        rc
    }
}

/// The instance whose pass is running, if any.
pub fn current_instance() -> Option<Instance> {
    COMPOSING.with(|c| c.borrow().last().cloned())
}

/// Slot-based remember
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    match current_instance() {
        Some(instance) => instance.remember_slot(init),
        None => {
            log::warn!("remember: called outside of a composition; value is not retained");
            Rc::new(init())
        }
    }
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

