use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Weak<ScopeInner>>> = const { RefCell::new(None) };
}

/// Liveness token of one instance: true while it is mounted, false forever after teardown.
///
/// Clones observe the same flag. Only the owning [`Scope`] can flip it.
#[derive(Clone)]
pub struct Liveness(Rc<Cell<LiveState>>);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum LiveState {
    Created,
    Live,
    Dead,
}

impl Liveness {
    fn new() -> Self {
        Self(Rc::new(Cell::new(LiveState::Created)))
    }

    /// A token with no owning scope: live for as long as it exists.
    pub(crate) fn detached() -> Self {
        let token = Self::new();
        token.activate();
        token
    }

    pub fn is_live(&self) -> bool {
        self.0.get() == LiveState::Live
    }

    /// True once teardown happened.
    pub fn is_dead(&self) -> bool {
        self.0.get() == LiveState::Dead
    }

    fn activate(&self) {
        if self.0.get() == LiveState::Created {
            self.0.set(LiveState::Live);
        }
    }

    fn kill(&self) -> bool {
        let was = self.0.replace(LiveState::Dead);
        was != LiveState::Dead
    }
}

impl std::fmt::Debug for Liveness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Liveness").field(&self.0.get()).finish()
    }
}

pub struct Scope {
    inner: Rc<ScopeInner>,
}

struct ScopeInner {
    liveness: Liveness,
    disposers: RefCell<Vec<Box<dyn FnOnce()>>>,
    children: RefCell<Vec<Scope>>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// A new, already-live scope.
    pub fn new() -> Self {
        let liveness = Liveness::new();
        liveness.activate();
        Self {
            inner: Rc::new(ScopeInner {
                liveness,
                disposers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn liveness(&self) -> Liveness {
        self.inner.liveness.clone()
    }

    pub fn is_live(&self) -> bool {
        self.inner.liveness.is_live()
    }

    /// Runs `f` with this scope as the current one.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        struct Restore(Option<Weak<ScopeInner>>);
        impl Drop for Restore {
            fn drop(&mut self) {
                let prev = self.0.take();
                CURRENT_SCOPE.with(|current| *current.borrow_mut() = prev);
            }
        }
        let prev = CURRENT_SCOPE.with(|current| {
            current
                .borrow_mut()
                .replace(Rc::downgrade(&self.inner))
        });
        let _restore = Restore(prev);
        f()
    }

    /// Registers a cleanup. On an already disposed scope it runs immediately.
    pub fn add_disposer(&self, disposer: impl FnOnce() + 'static) {
        if self.inner.liveness.is_dead() {
            log::debug!("scope: disposer added after teardown; running now");
            disposer();
            return;
        }
        self.inner.disposers.borrow_mut().push(Box::new(disposer));
    }

    pub fn child(&self) -> Scope {
        let child = Scope::new();
        self.inner.children.borrow_mut().push(child.clone());
        child
    }

    /// Tears the scope down: children first, then disposers in registration order.
    /// Later calls are no-ops.
    pub fn dispose(&self) {
        self.inner.teardown();
    }

    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl ScopeInner {
    fn teardown(&self) {
        if !self.liveness.kill() {
            return;
        }
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.dispose();
        }

        let disposers = std::mem::take(&mut *self.disposers.borrow_mut());
        log::trace!("scope: running {} disposer(s)", disposers.len());
        for disposer in disposers {
            disposer();
        }
    }
}

impl Clone for Scope {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

pub fn current_scope() -> Option<Scope> {
    CURRENT_SCOPE.with(|current| {
        current
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade().map(|inner| Scope { inner }))
    })
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn liveness_never_resurrects() {
        let scope = Scope::new();
        let token = scope.liveness();
        assert!(token.is_live());

        scope.dispose();
        assert!(!token.is_live());
        assert!(token.is_dead());

        token.activate();
        assert!(!token.is_live());
    }

    #[test]
    fn children_dispose_before_parent_disposers() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let parent = Scope::new();
        let child = parent.child();

        let o = order.clone();
        parent.add_disposer(move || o.borrow_mut().push("parent"));
        let o = order.clone();
        child.add_disposer(move || o.borrow_mut().push("child"));

        parent.dispose();
        parent.dispose();
        assert_eq!(*order.borrow(), vec!["child", "parent"]);
        assert!(!child.is_live());
    }

    #[test]
    fn current_scope_is_restored() {
        let outer = Scope::new();
        let inner = Scope::new();
        outer.run(|| {
            inner.run(|| {
                assert!(current_scope().is_some_and(|s| s.ptr_eq(&inner)));
            });
            assert!(current_scope().is_some_and(|s| s.ptr_eq(&outer)));
        });
        assert!(current_scope().is_none());
    }
}
