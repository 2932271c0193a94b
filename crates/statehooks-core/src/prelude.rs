pub use crate::async_state::{AsyncAction, AsyncState, AsyncStatus};
pub use crate::boundary::ErrorBoundary;
pub use crate::context::{Provider, use_context};
pub use crate::deferred::{Completer, Deferred};
pub use crate::effects::{Dispose, on_unmount, use_effect};
pub use crate::error::{FetchError, HookError, RenderError};
pub use crate::event_loop::EventLoop;
pub use crate::memo::{Callback, use_callback, use_memo};
pub use crate::reducer::{Dispatch, SetState, use_reducer, use_state};
pub use crate::runtime::{Instance, remember, remember_state};
pub use crate::scope::{Liveness, Scope};
pub use crate::signal::{Signal, signal, use_signal};
pub use crate::source::{FetchConfig, Item, ItemSource, MockPokemonApi};
pub use crate::use_async::{AsyncRunner, UseAsync, use_async};
pub use crate::view::View;
