//! A count shared by sibling components through a provider.

use std::rc::Rc;

use crate::context::{Provider, require_context};
use crate::error::{HookError, RenderError};
use crate::memo::Callback;
use crate::reducer::{SetState, state_cell};
use crate::signal::{Signal, use_signal};
use crate::view::View;

pub struct CountContext {
    count: Signal<i64>,
    set_count: SetState<i64>,
}

#[derive(Clone)]
pub struct CountProvider(Provider<CountContext>);

impl Default for CountProvider {
    fn default() -> Self {
        Self::new(0)
    }
}

impl CountProvider {
    pub fn new(initial: i64) -> Self {
        let (count, set_count) = state_cell(initial);
        Self(Provider::new(CountContext { count, set_count }))
    }

    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        self.0.provide(f)
    }

    pub fn count(&self) -> i64 {
        self.0.value().count.get()
    }

    pub fn context(&self) -> Rc<CountContext> {
        self.0.value()
    }
}

pub fn use_count() -> Result<(i64, SetState<i64>), HookError> {
    let ctx = require_context::<CountContext>("use_count", "CountProvider")?;
    let count = use_signal(&ctx.count);
    Ok((count, ctx.set_count.clone()))
}

pub fn count_display() -> Result<View, RenderError> {
    let (count, _) = use_count()?;
    Ok(View::text(format!("The current count is {count}")))
}

/// The increment button and its click handler.
pub fn count_button() -> Result<(View, Callback<()>), RenderError> {
    let (_, set_count) = use_count()?;
    let increment = Callback::new(move |()| set_count.update(|c| c.saturating_add(1)));
    Ok((View::button("Increment count"), increment))
}
