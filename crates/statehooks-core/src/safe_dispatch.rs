use std::cell::Cell;
use std::rc::Rc;

use crate::memo::use_memo;
use crate::reducer::Dispatch;
use crate::runtime::current_instance;
use crate::scope::Liveness;

/// A dispatch that is silently dropped once its owner has been torn down.
///
/// The liveness token is checked when the action would be delivered, not when
/// the work that produced it started.
pub struct SafeDispatch<A: 'static> {
    guarded: Dispatch<A>,
    liveness: Liveness,
    dropped: Rc<Cell<u64>>,
}

impl<A> Clone for SafeDispatch<A> {
    fn clone(&self) -> Self {
        Self {
            guarded: self.guarded.clone(),
            liveness: self.liveness.clone(),
            dropped: self.dropped.clone(),
        }
    }
}

impl<A> PartialEq for SafeDispatch<A> {
    fn eq(&self, other: &Self) -> bool {
        self.guarded == other.guarded
    }
}

impl<A: 'static> SafeDispatch<A> {
    pub fn new(dispatch: Dispatch<A>, liveness: Liveness) -> Self {
        let dropped = Rc::new(Cell::new(0u64));
        let guarded = {
            let liveness = liveness.clone();
            let dropped = dropped.clone();
            Dispatch::new(move |action| {
                if liveness.is_live() {
                    dispatch.call(action);
                } else {
                    dropped.set(dropped.get() + 1);
                    log::debug!("safe dispatch: owner torn down; action dropped");
                }
            })
        };
        Self {
            guarded,
            liveness,
            dropped,
        }
    }

    /// Delivers `action` if the owner is still live. Returns whether it was delivered.
    pub fn dispatch(&self, action: A) -> bool {
        let live = self.liveness.is_live();
        self.guarded.call(action);
        live
    }

    /// The guarded dispatch as a plain [`Dispatch`].
    pub fn as_dispatch(&self) -> Dispatch<A> {
        self.guarded.clone()
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    /// How many actions were dropped because the owner was gone.
    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }
}

/// Wraps `dispatch` with the current instance's liveness. The result keeps its
/// identity for as long as `dispatch` does.
pub fn use_safe_dispatch<A: 'static>(dispatch: &Dispatch<A>) -> SafeDispatch<A> {
    let liveness = match current_instance() {
        Some(instance) => instance.liveness(),
        None => {
            log::warn!("use_safe_dispatch: called outside of a composition; never torn down");
            Liveness::detached()
        }
    };
    let dispatch = dispatch.clone();
    use_memo(dispatch.clone(), move || SafeDispatch::new(dispatch, liveness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Instance;
    use crate::scope::Scope;

    #[test]
    fn drops_after_teardown() {
        let scope = Scope::new();
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        let safe = SafeDispatch::new(Dispatch::new(move |n: u32| s.set(s.get() + n)), scope.liveness());

        assert!(safe.dispatch(1));
        let plain = safe.as_dispatch();
        scope.dispose();
        assert!(!safe.dispatch(10));
        plain.call(100);
        assert_eq!(seen.get(), 1);
        assert_eq!(safe.dropped(), 2);
        assert!(safe.liveness().is_dead());
    }

    #[test]
    fn identity_follows_wrapped_dispatch() {
        let instance = Instance::new("guarded");
        let dispatch = Dispatch::new(|_: ()| {});
        let a = instance.compose(|| use_safe_dispatch(&dispatch));
        let b = instance.compose(|| use_safe_dispatch(&dispatch));
        assert!(a == b);

        let other = Dispatch::new(|_: ()| {});
        let c = instance.compose(|| use_safe_dispatch(&other));
        assert!(a != c);
    }
}
