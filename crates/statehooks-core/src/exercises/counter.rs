//! Counter driven by a merging reducer.

use crate::memo::Callback;
use crate::reducer::use_reducer;
use crate::view::View;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountState {
    pub count: i64,
}

/// Fields left `None` keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PartialCount {
    pub count: Option<i64>,
}

impl PartialCount {
    pub fn count(count: i64) -> Self {
        Self { count: Some(count) }
    }
}

pub enum CountAction {
    Merge(PartialCount),
    With(Box<dyn FnOnce(&CountState) -> PartialCount>),
}

impl CountAction {
    pub fn with(f: impl FnOnce(&CountState) -> PartialCount + 'static) -> Self {
        CountAction::With(Box::new(f))
    }
}

pub fn count_reducer(state: &CountState, action: CountAction) -> CountState {
    let partial = match action {
        CountAction::Merge(partial) => partial,
        CountAction::With(f) => f(state),
    };
    CountState {
        count: partial.count.unwrap_or(state.count),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterProps {
    pub initial_count: i64,
    pub step: i64,
}

impl Default for CounterProps {
    fn default() -> Self {
        Self {
            initial_count: 0,
            step: 1,
        }
    }
}

pub struct CounterView {
    pub count: i64,
    /// Increments from whatever the state is when the action is applied.
    pub increment_by_function: Callback<()>,
    /// Increments from the count this pass rendered.
    pub increment_by_object: Callback<()>,
    pub view: View,
}

pub fn counter(props: CounterProps) -> CounterView {
    let (state, set_state) = use_reducer(count_reducer, || CountState {
        count: props.initial_count,
    });
    let CountState { count } = state;
    let step = props.step;

    let increment_by_function = {
        let set_state = set_state.clone();
        Callback::new(move |()| {
            set_state.call(CountAction::with(move |current| {
                PartialCount::count(current.count.saturating_add(step))
            }))
        })
    };
    let increment_by_object = Callback::new(move |()| {
        set_state.call(CountAction::Merge(PartialCount::count(count.saturating_add(step))))
    });

    CounterView {
        count,
        increment_by_function,
        increment_by_object,
        view: View::Column(vec![
            View::button(count.to_string()),
            View::button(count.to_string()),
        ]),
    }
}
