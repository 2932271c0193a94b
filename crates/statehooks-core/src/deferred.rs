use std::cell::RefCell;
use std::rc::Rc;

type Settle<T, E> = Box<dyn FnOnce(Result<T, E>)>;

struct Shared<T, E> {
    outcome: Option<Result<T, E>>,
    callback: Option<Settle<T, E>>,
}

/// A value that becomes available (or fails) later.
///
/// Exactly one success/failure callback pair can be attached, and it fires at
/// most once. A callback attached after completion fires immediately.
pub struct Deferred<T: 'static, E: 'static> {
    shared: Rc<RefCell<Shared<T, E>>>,
}

/// Write side of a [`Deferred`]. Settling consumes it, so completion happens once.
pub struct Completer<T: 'static, E: 'static> {
    shared: Rc<RefCell<Shared<T, E>>>,
}

impl<T: 'static, E: 'static> Deferred<T, E> {
    pub fn pending() -> (Deferred<T, E>, Completer<T, E>) {
        let shared = Rc::new(RefCell::new(Shared {
            outcome: None,
            callback: None,
        }));
        (
            Deferred {
                shared: shared.clone(),
            },
            Completer { shared },
        )
    }

    pub fn resolved(value: T) -> Self {
        Self::settled(Ok(value))
    }

    pub fn rejected(error: E) -> Self {
        Self::settled(Err(error))
    }

    pub fn settled(outcome: Result<T, E>) -> Self {
        Deferred {
            shared: Rc::new(RefCell::new(Shared {
                outcome: Some(outcome),
                callback: None,
            })),
        }
    }

    pub fn is_settled(&self) -> bool {
        self.shared.borrow().outcome.is_some()
    }

    /// Attaches the completion callback.
    pub fn on_settle(self, f: impl FnOnce(Result<T, E>) + 'static) {
        let outcome = {
            let mut shared = self.shared.borrow_mut();
            match shared.outcome.take() {
                Some(outcome) => outcome,
                None => {
                    shared.callback = Some(Box::new(f));
                    return;
                }
            }
        };
        f(outcome);
    }

    pub fn then(self, on_ok: impl FnOnce(T) + 'static, on_err: impl FnOnce(E) + 'static) {
        self.on_settle(move |outcome| match outcome {
            Ok(value) => on_ok(value),
            Err(error) => on_err(error),
        });
    }

    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U + 'static) -> Deferred<U, E> {
        let (next, completer) = Deferred::pending();
        self.on_settle(move |outcome| completer.settle(outcome.map(f)));
        next
    }

    pub fn map_err<F: 'static>(self, f: impl FnOnce(E) -> F + 'static) -> Deferred<T, F> {
        let (next, completer) = Deferred::pending();
        self.on_settle(move |outcome| completer.settle(outcome.map_err(f)));
        next
    }

    /// Observes a successful value before passing it on unchanged.
    pub fn inspect(self, f: impl FnOnce(&T) + 'static) -> Deferred<T, E> {
        self.map(move |value| {
            f(&value);
            value
        })
    }
}

impl<T: 'static, E: 'static> Completer<T, E> {
    pub fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    pub fn reject(self, error: E) {
        self.settle(Err(error));
    }

    pub fn settle(self, outcome: Result<T, E>) {
        let callback = {
            let mut shared = self.shared.borrow_mut();
            match shared.callback.take() {
                Some(callback) => callback,
                None => {
                    shared.outcome = Some(outcome);
                    return;
                }
            }
        };
        callback(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn callback_fires_once_on_completion() {
        let (deferred, completer) = Deferred::<u32, String>::pending();
        let seen = Rc::new(Cell::new(0));
        let s = seen.clone();
        deferred.then(move |v| s.set(v), |_| panic!("rejected"));
        assert_eq!(seen.get(), 0);
        completer.resolve(35);
        assert_eq!(seen.get(), 35);
    }

    #[test]
    fn late_callback_sees_stored_outcome() {
        let (deferred, completer) = Deferred::<u32, String>::pending();
        completer.reject("offline".into());
        assert!(deferred.is_settled());

        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        deferred.then(|_| panic!("resolved"), move |e| *s.borrow_mut() = Some(e));
        assert_eq!(seen.borrow().as_deref(), Some("offline"));
    }

    #[test]
    fn map_and_inspect_chain() {
        let (deferred, completer) = Deferred::<u32, String>::pending();
        let inspected = Rc::new(Cell::new(0));
        let i = inspected.clone();
        let out = Rc::new(Cell::new(0));
        let o = out.clone();
        deferred
            .inspect(move |v| i.set(*v))
            .map(|v| v * 2)
            .then(move |v| o.set(v), |_| {});
        completer.resolve(21);
        assert_eq!(inspected.get(), 21);
        assert_eq!(out.get(), 42);
    }

    #[test]
    fn inspect_skips_failures() {
        let touched = Rc::new(Cell::new(false));
        let t = touched.clone();
        Deferred::<u32, &str>::rejected("x")
            .inspect(move |_| t.set(true))
            .then(|_| {}, |_| {});
        assert!(!touched.get());
    }

    #[test]
    fn map_err_converts_failures() {
        let (deferred, completer) = Deferred::<u32, &str>::pending();
        let seen = Rc::new(RefCell::new(None));
        let s = seen.clone();
        deferred
            .map_err(|e| e.len())
            .then(|_| panic!("resolved"), move |n| *s.borrow_mut() = Some(n));
        completer.reject("offline");
        assert_eq!(*seen.borrow(), Some(7));
    }
}
