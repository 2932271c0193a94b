use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct SubId;
}

type Subscriber<T> = Rc<dyn Fn(&T)>;

/// Observable value. Cloning yields another handle to the same cell.
pub struct Signal<T: 'static>(Rc<RefCell<Inner<T>>>);

struct Inner<T> {
    value: Rc<T>,
    subs: SlotMap<SubId, Subscriber<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            value: Rc::new(value),
            subs: SlotMap::with_key(),
        })))
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.0.borrow().value)
    }

    /// Read the current value without cloning it. The cell is not borrowed
    /// while `f` runs, so `f` may write back.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.0.borrow().value.clone();
        f(&value)
    }

    pub fn set(&self, v: T) {
        self.0.borrow_mut().value = Rc::new(v);
        self.notify();
    }

    pub fn update<F: FnOnce(&mut T)>(&self, f: F)
    where
        T: Clone,
    {
        {
            let mut inner = self.0.borrow_mut();
            f(Rc::make_mut(&mut inner.value));
        }
        self.notify();
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        self.0.borrow_mut().subs.insert(Rc::new(f))
    }

    pub fn unsubscribe(&self, id: SubId) -> bool {
        self.0.borrow_mut().subs.remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.0.borrow().subs.len()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // Value and subscribers are snapshotted before any subscriber runs, so a
    // subscriber may write, subscribe or unsubscribe. A nested write notifies
    // with its own value; the outer loop keeps delivering the older snapshot.
    fn notify(&self) {
        let (value, subs) = {
            let inner = self.0.borrow();
            let subs: Vec<Subscriber<T>> = inner.subs.values().cloned().collect();
            (inner.value.clone(), subs)
        };
        for s in subs {
            s(&value);
        }
    }
}

pub fn signal<T>(t: T) -> Signal<T> {
    Signal::new(t)
}

type SignalSub<T> = Rc<RefCell<Option<(Signal<T>, SubId)>>>;

/// Reads `signal` and re-composes the current instance whenever it is written.
/// The subscription ends when the instance unmounts.
pub fn use_signal<T: Clone + 'static>(signal: &Signal<T>) -> T {
    let Some(instance) = crate::runtime::current_instance() else {
        return signal.get();
    };
    let slot: SignalSub<T> = crate::runtime::remember_state(|| None);

    let subscribed = matches!(slot.borrow().as_ref(), Some((s, _)) if s.ptr_eq(signal));
    if !subscribed {
        let previous = slot.borrow_mut().take();
        match previous {
            Some((old, id)) => {
                old.unsubscribe(id);
            }
            None => {
                let on_teardown = slot.clone();
                instance.scope().add_disposer(move || {
                    let sub = on_teardown.borrow_mut().take();
                    if let Some((sig, id)) = sub {
                        sig.unsubscribe(id);
                    }
                });
            }
        }
        let invalidator = instance.invalidator();
        let id = signal.subscribe(move |_| invalidator.invalidate());
        *slot.borrow_mut() = Some((signal.clone(), id));
    }
    signal.get()
}
