//! # State hooks without a renderer
//!
//! A small, single-threaded hook runtime and the state patterns built on it:
//!
//! - `Signal<T>`: observable value.
//! - `Instance` + `remember*`: per-component hook slots, order based.
//! - `use_reducer` / `use_state`: reducer state that schedules another pass.
//! - `use_effect`: work after a pass, with cleanup on change or unmount.
//! - `use_memo` / `use_callback`: values and callbacks with stable identity.
//! - `Provider` / `use_context`: scoped shared values.
//! - `use_async`: idle/pending/resolved/rejected status driven by a
//!   `Deferred`, guarded against completions after unmount.
//!
//! ## Components
//!
//! A component is a plain function that calls hooks. It runs inside
//! [`Instance::compose`]; state changes mark the instance dirty so the owner
//! knows to compose again:
//!
//! ```rust
//! use statehooks_core::*;
//!
//! fn clicks() -> (u32, SetState<u32>) {
//!     use_state(|| 0)
//! }
//!
//! let instance = Instance::new("Clicks");
//! let (n, set) = instance.compose(clicks);
//! assert_eq!(n, 0);
//!
//! set.update(|n| n + 1);
//! assert!(instance.is_dirty());
//! let (n, _) = instance.compose(clicks);
//! assert_eq!(n, 1);
//! ```
//!
//! ## Async work
//!
//! Work is represented by a [`Deferred`] and time by an [`EventLoop`] with a
//! virtual clock, so nothing here needs an async runtime. Once an instance
//! unmounts its liveness token goes false and any transition that would land
//! afterwards is dropped.

pub mod async_state;
pub mod boundary;
pub mod cache;
pub mod context;
pub mod debug;
pub mod deferred;
pub mod effects;
pub mod error;
pub mod event_loop;
pub mod exercises;
pub mod media;
pub mod memo;
pub mod prelude;
pub mod reducer;
pub mod runtime;
pub mod safe_dispatch;
pub mod scope;
pub mod signal;
pub mod source;
pub mod use_async;
pub mod view;

pub use async_state::*;
pub use boundary::*;
pub use cache::*;
pub use context::*;
pub use debug::*;
pub use deferred::*;
pub use effects::*;
pub use error::*;
pub use event_loop::*;
pub use media::*;
pub use memo::*;
pub use prelude::*;
pub use reducer::*;
pub use runtime::*;
pub use safe_dispatch::*;
pub use scope::*;
pub use signal::*;
pub use source::*;
pub use use_async::*;
pub use view::*;
