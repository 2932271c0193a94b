use std::rc::Rc;

use crate::runtime::{current_instance, remember};
use crate::signal::{Signal, signal};

/// A pure state transition: `(state, action) -> next state`.
pub trait Reducer: 'static {
    type State: Clone + 'static;
    type Action: 'static;

    fn reduce(state: &Self::State, action: Self::Action) -> Self::State;
}

/// Cloneable dispatch handle. Two handles compare equal only when they are
/// clones of the same dispatch, which makes it usable as an effect dependency.
pub struct Dispatch<A: 'static>(Rc<dyn Fn(A)>);

impl<A> Dispatch<A> {
    pub fn new(f: impl Fn(A) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, action: A) {
        (self.0)(action)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<A> PartialEq for Dispatch<A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A> std::fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Dispatch({:p})", Rc::as_ptr(&self.0))
    }
}

/// Reducer-owned state plus its dispatch, usable outside composition.
pub struct ReducerCell<S: 'static, A: 'static> {
    state: Signal<S>,
    dispatch: Dispatch<A>,
}

impl<S: 'static, A: 'static> Clone for ReducerCell<S, A> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            dispatch: self.dispatch.clone(),
        }
    }
}

impl<S: 'static, A: 'static> ReducerCell<S, A> {
    pub fn new(reduce: impl Fn(&S, A) -> S + 'static, initial: S) -> Self {
        let state = signal(initial);
        let dispatch = {
            let state = state.clone();
            Dispatch::new(move |action| {
                let next = state.with(|s| reduce(s, action));
                state.set(next);
            })
        };
        Self { state, dispatch }
    }

    pub fn signal(&self) -> &Signal<S> {
        &self.state
    }

    pub fn dispatch(&self) -> Dispatch<A> {
        self.dispatch.clone()
    }

    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.state.get()
    }
}

impl<S: Clone + 'static, A: 'static> ReducerCell<S, A> {
    pub fn of<R: Reducer<State = S, Action = A>>(initial: S) -> Self {
        ReducerCell::new(R::reduce, initial)
    }
}

/// Reducer state held by the current instance. Every dispatch schedules another pass.
pub fn use_reducer<S: Clone + 'static, A: 'static>(
    reduce: impl Fn(&S, A) -> S + 'static,
    init: impl FnOnce() -> S,
) -> (S, Dispatch<A>) {
    let cell = remember(|| {
        let cell = ReducerCell::new(reduce, init());
        if let Some(instance) = current_instance() {
            let invalidator = instance.invalidator();
            cell.signal().subscribe(move |_| invalidator.invalidate());
        }
        cell
    });
    (cell.state(), cell.dispatch())
}

/// `use_reducer` for a [`Reducer`] implementation.
pub fn use_reducer_of<R: Reducer>(init: impl FnOnce() -> R::State) -> (R::State, Dispatch<R::Action>) {
    use_reducer(R::reduce, init)
}

/// Replacement value or updater for [`use_state`].
pub enum StateAction<T> {
    Replace(T),
    Update(Box<dyn FnOnce(&T) -> T>),
}

fn apply_state_action<T: Clone>(state: &T, action: StateAction<T>) -> T {
    match action {
        StateAction::Replace(value) => value,
        StateAction::Update(f) => f(state),
    }
}

/// Setter returned by [`use_state`].
pub struct SetState<T: 'static>(Dispatch<StateAction<T>>);

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> PartialEq for SetState<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: 'static> SetState<T> {
    pub fn set(&self, value: T) {
        self.0.call(StateAction::Replace(value));
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.0.call(StateAction::Update(Box::new(f)));
    }
}

pub fn use_state<T: Clone + 'static>(init: impl FnOnce() -> T) -> (T, SetState<T>) {
    let (value, dispatch) = use_reducer(apply_state_action::<T>, init);
    (value, SetState(dispatch))
}

/// A `(value, setter)` pair that lives outside any instance, e.g. inside a provider.
pub fn state_cell<T: Clone + 'static>(initial: T) -> (Signal<T>, SetState<T>) {
    let cell = ReducerCell::new(apply_state_action::<T>, initial);
    (cell.signal().clone(), SetState(cell.dispatch()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Instance;

    struct Toggle;

    impl Reducer for Toggle {
        type State = bool;
        type Action = ();

        fn reduce(state: &bool, _: ()) -> bool {
            !state
        }
    }

    #[test]
    fn reducer_cell_applies_in_order() {
        let cell = ReducerCell::of::<Toggle>(false);
        let dispatch = cell.dispatch();
        dispatch.call(());
        dispatch.call(());
        dispatch.call(());
        assert!(cell.state());
        assert!(dispatch.ptr_eq(&cell.dispatch()));
    }

    #[test]
    fn dispatch_marks_instance_dirty() {
        let instance = Instance::new("toggle");
        let (on, dispatch) = instance.compose(|| use_reducer_of::<Toggle>(|| false));
        assert!(!on);
        assert!(!instance.is_dirty());

        dispatch.call(());
        assert!(instance.is_dirty());
        let (on, again) = instance.compose(|| use_reducer_of::<Toggle>(|| false));
        assert!(on);
        assert_eq!(dispatch, again);
    }

    #[test]
    fn set_state_replaces_or_updates() {
        let (value, set) = state_cell(1);
        set.set(5);
        set.update(|v| v * 10);
        assert_eq!(value.get(), 50);
        assert!(set == set.clone());
    }
}
