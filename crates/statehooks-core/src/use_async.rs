//! Asynchronous status hooks.
//!
//! [`use_async`] drives an [`AsyncState`] from a [`Deferred`]: `run` moves the
//! state to `Pending` right away and to `Resolved`/`Rejected` when the work
//! settles. Every transition goes through a [`SafeDispatch`], so work that
//! completes after the owning instance unmounted changes nothing.
//!
//! ```rust
//! use statehooks_core::*;
//!
//! let ev = EventLoop::new();
//! let instance = Instance::new("Example");
//!
//! let handle = instance.compose(|| use_async::<u32, String>(None));
//! handle.run.call(ev.delay(Ok(35), std::time::Duration::from_millis(10)));
//! assert!(instance.compose(|| use_async::<u32, String>(None)).state.is_pending());
//!
//! ev.run_until_idle();
//! let handle = instance.compose(|| use_async::<u32, String>(None));
//! assert_eq!(handle.state.data(), Some(&35));
//! ```

use crate::async_state::{AsyncAction, AsyncState, reduce};
use crate::deferred::Deferred;
use crate::effects::{Dispose, use_effect};
use crate::memo::{Callback, use_callback};
use crate::reducer::{ReducerCell, use_reducer};
use crate::safe_dispatch::{SafeDispatch, use_safe_dispatch};
use crate::scope::Liveness;
use crate::signal::{Signal, SubId};

/// What [`use_async`] hands back for one pass.
pub struct UseAsync<T: 'static, E: 'static> {
    pub state: AsyncState<T, E>,
    pub run: Callback<Deferred<T, E>>,
    pub set_data: Callback<T>,
    pub set_error: Callback<E>,
}

impl<T: Clone, E: Clone> Clone for UseAsync<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            run: self.run.clone(),
            set_data: self.set_data.clone(),
            set_error: self.set_error.clone(),
        }
    }
}

/// Dispatches `Pending`, then the outcome of `work`, through `dispatch`.
fn drive<T: 'static, E: 'static>(dispatch: &SafeDispatch<AsyncAction<T, E>>, work: Deferred<T, E>) {
    dispatch.dispatch(AsyncAction::Pending);
    let dispatch = dispatch.clone();
    work.on_settle(move |outcome| {
        let action = AsyncAction::from(outcome);
        log::trace!("async: work settled as {}", action.status());
        dispatch.dispatch(action);
    });
}

/// Reducer-backed async status for the current instance. `initial` defaults to `Idle`.
///
/// `run`, `set_data` and `set_error` keep their identity across passes.
pub fn use_async<T, E>(initial: Option<AsyncState<T, E>>) -> UseAsync<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    let (state, unsafe_dispatch) = use_reducer(reduce::<T, E>, || initial.unwrap_or_default());
    let dispatch = use_safe_dispatch(&unsafe_dispatch);

    let run = {
        let d = dispatch.clone();
        use_callback(dispatch.clone(), move |work: Deferred<T, E>| drive(&d, work))
    };
    let set_data = {
        let d = dispatch.clone();
        use_callback(dispatch.clone(), move |data: T| {
            d.dispatch(AsyncAction::Resolved(data));
        })
    };
    let set_error = {
        let d = dispatch.clone();
        use_callback(dispatch, move |error: E| {
            d.dispatch(AsyncAction::Rejected(error));
        })
    };

    UseAsync {
        state,
        run,
        set_data,
        set_error,
    }
}

/// Starts the work returned by `callback` whenever `deps` change.
///
/// `None` means there is nothing to do and leaves the state as it is.
pub fn use_async_effect<T, E, D>(
    callback: impl FnOnce() -> Option<Deferred<T, E>> + 'static,
    initial: AsyncState<T, E>,
    deps: D,
) -> AsyncState<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
    D: PartialEq + 'static,
{
    let (state, unsafe_dispatch) = use_reducer(reduce::<T, E>, || initial);
    let dispatch = use_safe_dispatch(&unsafe_dispatch);

    use_effect(deps, move || {
        if let Some(work) = callback() {
            drive(&dispatch, work);
        }
        Dispose::noop()
    });

    state
}

/// The same runner without a composition: the owner supplies the liveness token.
pub struct AsyncRunner<T: 'static, E: 'static> {
    cell: ReducerCell<AsyncState<T, E>, AsyncAction<T, E>>,
    dispatch: SafeDispatch<AsyncAction<T, E>>,
}

impl<T: Clone + 'static, E: Clone + 'static> AsyncRunner<T, E> {
    pub fn new(initial: AsyncState<T, E>, liveness: Liveness) -> Self {
        let cell = ReducerCell::new(reduce::<T, E>, initial);
        let dispatch = SafeDispatch::new(cell.dispatch(), liveness);
        Self { cell, dispatch }
    }

    pub fn state(&self) -> AsyncState<T, E> {
        self.cell.state()
    }

    pub fn signal(&self) -> &Signal<AsyncState<T, E>> {
        self.cell.signal()
    }

    /// Observes every transition that actually happens.
    pub fn subscribe(&self, f: impl Fn(&AsyncState<T, E>) + 'static) -> SubId {
        self.cell.signal().subscribe(f)
    }

    pub fn run(&self, work: Deferred<T, E>) {
        drive(&self.dispatch, work);
    }

    pub fn set_data(&self, data: T) {
        self.dispatch.dispatch(AsyncAction::Resolved(data));
    }

    pub fn set_error(&self, error: E) {
        self.dispatch.dispatch(AsyncAction::Rejected(error));
    }

    /// Transitions suppressed because the owner was gone.
    pub fn dropped(&self) -> u64 {
        self.dispatch.dropped()
    }
}
