use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::{current_instance, remember};

/// Cleanup handed back by an effect. Running consumes it, so it runs at most once;
/// dropping it without running skips the cleanup.
#[must_use = "a cleanup does nothing unless returned from an effect or run"]
pub struct Dispose(Option<Box<dyn FnOnce()>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(f)))
    }

    pub fn noop() -> Self {
        Self(None)
    }

    pub fn is_noop(&self) -> bool {
        self.0.is_none()
    }

    pub fn run(self) {
        if let Some(f) = self.0 {
            f()
        }
    }
}

/// Cleanup to return from a `use_effect` body; runs when deps change or the instance unmounts.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

struct EffectSlot<D> {
    last_deps: RefCell<Option<D>>,
    cleanup: Rc<RefCell<Option<Dispose>>>,
}

/// Runs `effect` after the current pass whenever `deps` differ from the previous
/// run. The previous cleanup runs first; the last cleanup runs on unmount.
pub fn use_effect<D: PartialEq + 'static>(deps: D, effect: impl FnOnce() -> Dispose + 'static) {
    let Some(instance) = current_instance() else {
        log::warn!("use_effect: called outside of a composition; running once, never cleaned up");
        let _ = effect();
        return;
    };

    let slot = remember(|| {
        let cleanup: Rc<RefCell<Option<Dispose>>> = Rc::new(RefCell::new(None));
        let on_teardown = cleanup.clone();
        instance.scope().add_disposer(move || {
            let d = on_teardown.borrow_mut().take();
            if let Some(d) = d {
                d.run();
            }
        });
        EffectSlot::<D> {
            last_deps: RefCell::new(None),
            cleanup,
        }
    });

    let changed = slot.last_deps.borrow().as_ref() != Some(&deps);
    if !changed {
        return;
    }
    *slot.last_deps.borrow_mut() = Some(deps);

    let cleanup = slot.cleanup.clone();
    instance.schedule_after_pass(move || {
        let previous = cleanup.borrow_mut().take();
        if let Some(d) = previous {
            d.run();
        }
        let d = effect();
        *cleanup.borrow_mut() = (!d.is_noop()).then_some(d);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::runtime::Instance;

    #[test]
    fn noop_cleanup_runs_nothing() {
        let d = Dispose::noop();
        assert!(d.is_noop());
        d.run();
        assert!(!on_unmount(|| {}).is_noop());
    }

    #[test]
    fn unchanged_deps_keep_cleanup_until_unmount() {
        let runs = Rc::new(Cell::new(0));
        let cleans = Rc::new(Cell::new(0));
        let instance = Instance::new("effect");
        for _ in 0..3 {
            let (r, c) = (runs.clone(), cleans.clone());
            instance.compose(move || {
                use_effect("same", move || {
                    r.set(r.get() + 1);
                    on_unmount(move || c.set(c.get() + 1))
                })
            });
        }
        assert_eq!((runs.get(), cleans.get()), (1, 0));
        instance.unmount();
        instance.unmount();
        assert_eq!(cleans.get(), 1);
    }
}
