//! Item lookup screens: a form-driven name, an info panel behind an error
//! boundary and, in the cached variant, a list of previously fetched names.

use std::rc::Rc;

use crate::async_state::AsyncState;
use crate::boundary::ErrorBoundary;
use crate::cache::{CacheAction, CacheProvider, ItemCache, use_item_cache};
use crate::effects::{Dispose, use_effect};
use crate::error::{FetchError, RenderError};
use crate::reducer::{SetState, state_cell};
use crate::runtime::Instance;
use crate::signal::{Signal, use_signal};
use crate::source::{Item, ItemSource};
use crate::use_async::{UseAsync, use_async, use_async_effect};
use crate::view::View;

/// Maps the four states onto what the info panel shows. A rejection is
/// re-raised for the enclosing boundary.
pub fn present(state: AsyncState<Item, FetchError>, name: &str) -> Result<View, RenderError> {
    match state {
        AsyncState::Idle => Ok(View::text("Submit a pokemon")),
        AsyncState::Pending => Ok(View::Fallback {
            name: name.to_string(),
        }),
        AsyncState::Rejected(error) => Err(error.into()),
        AsyncState::Resolved(item) => Ok(View::Data(item)),
    }
}

/// Info panel that fetches whenever `name` changes.
pub fn pokemon_info(source: Rc<dyn ItemSource>, name: &str) -> Result<View, RenderError> {
    let owned = name.to_string();
    let state = use_async_effect(
        move || {
            if owned.is_empty() {
                return None;
            }
            Some(source.fetch(&owned))
        },
        AsyncState::initial(!name.is_empty()),
        name.to_string(),
    );
    if name.is_empty() {
        return Ok(View::text("Submit a pokemon"));
    }
    present(state, name)
}

/// Info panel that serves repeated names from the surrounding [`CacheProvider`].
pub fn cached_pokemon_info(source: Rc<dyn ItemSource>, name: &str) -> Result<View, RenderError> {
    let (cache, add) = use_item_cache()?;
    let UseAsync {
        state,
        run,
        set_data,
        ..
    } = use_async::<Item, FetchError>(None);

    let owned = name.to_string();
    let cached = cache.get(name).cloned();
    use_effect(
        (owned.clone(), cache.revision(), run.clone(), set_data.clone(), add.clone()),
        move || {
            if owned.is_empty() {
                return Dispose::noop();
            }
            match cached {
                Some(item) => {
                    log::debug!("info: '{owned}' served from cache");
                    set_data.call(item);
                }
                None => {
                    let key = owned.clone();
                    run.call(source.fetch(&owned).inspect(move |item| {
                        add.call(CacheAction::Add {
                            name: key,
                            item: item.clone(),
                        })
                    }));
                }
            }
            Dispose::noop()
        },
    );

    present(state, name)
}

/// Names in the cache, one button each, oldest first.
pub fn previous_pokemon() -> Result<View, RenderError> {
    let (cache, _) = use_item_cache()?;
    let mut rows = vec![View::text("Previous Pokemon")];
    rows.extend(cache.names().iter().map(View::button));
    Ok(View::Column(rows))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfoVariant {
    /// Fetch on every name change.
    Effect,
    /// Share fetched items between siblings through a cache provider.
    Cached,
}

/// Whole screen: name form, optional history list and the info panel.
pub struct PokemonApp {
    variant: InfoVariant,
    source: Rc<dyn ItemSource>,
    root: Instance,
    history: Instance,
    cache: CacheProvider,
    boundary: ErrorBoundary<String>,
    name: Signal<String>,
    set_name: SetState<String>,
}

impl PokemonApp {
    pub fn new(variant: InfoVariant, source: Rc<dyn ItemSource>) -> Self {
        let root = Instance::new("App");
        let history = root.child("PreviousPokemon");
        let cache = CacheProvider::in_scope(root.scope());
        let boundary = ErrorBoundary::within(&root, "PokemonInfo");
        let (name, set_name) = state_cell(String::new());
        Self {
            variant,
            source,
            root,
            history,
            cache,
            boundary,
            name,
            set_name,
        }
    }

    /// Form submission.
    pub fn submit(&self, name: impl Into<String>) {
        self.set_name.set(name.into());
    }

    /// Picking a name from the history list.
    pub fn select(&self, name: impl Into<String>) {
        self.set_name.set(name.into());
    }

    /// Clears the name, e.g. from the boundary's "Try again".
    pub fn reset(&self) {
        self.set_name.set(String::new());
        self.boundary.reset();
    }

    pub fn name(&self) -> String {
        self.name.get()
    }

    pub fn cache(&self) -> Rc<ItemCache> {
        self.cache.cache()
    }

    pub fn boundary(&self) -> &ErrorBoundary<String> {
        &self.boundary
    }

    pub fn root(&self) -> &Instance {
        &self.root
    }

    pub fn is_dirty(&self) -> bool {
        self.root.is_dirty()
    }

    pub fn render(&self) -> View {
        self.root.compose(|| {
            let name = use_signal(&self.name);
            let form = View::text(format!("Pokemon name: {name}"));
            match self.variant {
                InfoVariant::Effect => {
                    let info = self.boundary.render(name.clone(), || {
                        pokemon_info(self.source.clone(), &name)
                    });
                    View::Column(vec![form, info])
                }
                InfoVariant::Cached => self.cache.provide(|| {
                    let history = self
                        .history
                        .compose(previous_pokemon)
                        .unwrap_or_else(|e| View::Error {
                            message: e.to_string(),
                        });
                    let info = self.boundary.render(name.clone(), || {
                        cached_pokemon_info(self.source.clone(), &name)
                    });
                    View::Column(vec![form, history, info])
                }),
            }
        })
    }

    /// Re-renders until nothing is dirty; returns the last view if any pass ran.
    pub fn settle(&self) -> Option<View> {
        let mut last = None;
        for _ in 0..MAX_SETTLE_PASSES {
            if !self.is_dirty() {
                break;
            }
            last = Some(self.render());
        }
        last
    }

    pub fn unmount(&self) {
        self.root.unmount();
    }
}

const MAX_SETTLE_PASSES: usize = 16;
