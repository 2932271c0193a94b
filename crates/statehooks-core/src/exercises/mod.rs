//! Self-contained screens built on the hooks in this crate.
//!
//! - [`counter`]: reducer that merges partial state.
//! - [`count_context`]: a count shared through a provider.
//! - [`pokemon`]: async lookups, with and without a shared cache.
//! - [`media_box`]: media-query observers.

pub mod count_context;
pub mod counter;
pub mod media_box;
pub mod pokemon;
