use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::remember;

/// A shared callback with identity. Clones compare equal; separately created
/// callbacks never do, even if their bodies are the same.
pub struct Callback<A: 'static, R: 'static = ()>(Rc<dyn Fn(A) -> R>);

impl<A, R> Callback<A, R> {
    pub fn new(f: impl Fn(A) -> R + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, arg: A) -> R {
        (self.0)(arg)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<A, R> Clone for Callback<A, R> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A, R> PartialEq for Callback<A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A, R> std::fmt::Debug for Callback<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0))
    }
}

struct MemoSlot<D, V> {
    cached: RefCell<Option<(D, V)>>,
}

/// Recomputes `compute` only when `deps` changed since the previous pass.
pub fn use_memo<D, V>(deps: D, compute: impl FnOnce() -> V) -> V
where
    D: PartialEq + 'static,
    V: Clone + 'static,
{
    let slot = remember(|| MemoSlot::<D, V> {
        cached: RefCell::new(None),
    });
    let mut cached = slot.cached.borrow_mut();
    if let Some((last, value)) = cached.as_ref()
        && *last == deps
    {
        return value.clone();
    }
    let value = compute();
    *cached = Some((deps, value.clone()));
    value
}

/// Returns the same [`Callback`] for as long as `deps` stay equal.
pub fn use_callback<D, A, R>(deps: D, f: impl Fn(A) -> R + 'static) -> Callback<A, R>
where
    D: PartialEq + 'static,
    A: 'static,
    R: 'static,
{
    use_memo(deps, move || Callback::new(f))
}
