use std::collections::HashMap;
use std::rc::Rc;

use crate::context::{Provider, require_context};
use crate::error::HookError;
use crate::reducer::{Dispatch, ReducerCell};
use crate::scope::Scope;
use crate::signal::use_signal;
use crate::source::Item;

/// Items fetched so far, in the order they were first added. Append-only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheState {
    order: Vec<String>,
    items: HashMap<String, Item>,
    revision: u64,
}

impl CacheState {
    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Bumped by every accepted action.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CacheAction {
    Add { name: String, item: Item },
}

pub fn cache_reducer(state: &CacheState, action: CacheAction) -> CacheState {
    match action {
        CacheAction::Add { name, item } => {
            let mut next = state.clone();
            if !next.items.contains_key(&name) {
                next.order.push(name.clone());
            }
            log::debug!("cache: add '{name}' ({} cached)", next.order.len());
            next.items.insert(name, item);
            next.revision += 1;
            next
        }
    }
}

/// The shared cache value handed out by a [`CacheProvider`].
#[derive(Clone)]
pub struct ItemCache {
    cell: ReducerCell<CacheState, CacheAction>,
}

impl Default for ItemCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemCache {
    pub fn new() -> Self {
        Self {
            cell: ReducerCell::new(cache_reducer, CacheState::default()),
        }
    }

    pub fn state(&self) -> CacheState {
        self.cell.state()
    }

    pub fn dispatch(&self) -> Dispatch<CacheAction> {
        self.cell.dispatch()
    }

    pub fn add(&self, name: impl Into<String>, item: Item) {
        self.cell.dispatch().call(CacheAction::Add {
            name: name.into(),
            item,
        });
    }
}

/// One cache per provider scope; siblings composed inside share it.
#[derive(Clone)]
pub struct CacheProvider(Provider<ItemCache>);

impl Default for CacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheProvider {
    pub fn new() -> Self {
        Self(Provider::new(ItemCache::new()))
    }

    pub fn in_scope(parent: &Scope) -> Self {
        Self(Provider::in_scope(parent, ItemCache::new()))
    }

    pub fn provide<R>(&self, f: impl FnOnce() -> R) -> R {
        self.0.provide(f)
    }

    pub fn cache(&self) -> Rc<ItemCache> {
        self.0.value()
    }

    pub fn dispose(&self) {
        self.0.dispose();
    }
}

/// Current cache contents and its dispatch; re-composes the caller on every add.
pub fn use_item_cache() -> Result<(CacheState, Dispatch<CacheAction>), HookError> {
    let cache = require_context::<ItemCache>("use_item_cache", "CacheProvider")?;
    let state = use_signal(cache.cell.signal());
    Ok((state, cache.dispatch()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Instance;

    fn item(name: &str, hp: u32) -> Item {
        Item {
            name: name.into(),
            number: 1,
            hp,
            image_url: String::new(),
            attacks: Vec::new(),
            fetched_at_ms: None,
        }
    }

    #[test]
    fn re_adding_keeps_first_position() {
        let cache = ItemCache::new();
        cache.add("pikachu", item("pikachu", 35));
        cache.add("mew", item("mew", 100));
        cache.add("pikachu", item("pikachu", 36));

        let state = cache.state();
        assert_eq!(state.names(), ["pikachu", "mew"]);
        assert_eq!(state.len(), 2);
        assert_eq!(state.get("pikachu").map(|i| i.hp), Some(36));
        assert_eq!(state.revision(), 3);
        assert!(!state.contains("ditto"));
    }

    #[test]
    fn siblings_share_one_cache() {
        let provider = CacheProvider::new();
        let writer = Instance::new("writer");
        let reader = Instance::new("reader");

        let (_, add) = provider.provide(|| writer.compose(use_item_cache)).unwrap();
        let (before, _) = provider.provide(|| reader.compose(use_item_cache)).unwrap();
        assert!(before.is_empty());

        add.call(CacheAction::Add {
            name: "mew".into(),
            item: item("mew", 100),
        });
        assert!(reader.is_dirty());
        let (after, _) = provider.provide(|| reader.compose(use_item_cache)).unwrap();
        assert_eq!(after.names(), ["mew"]);
    }

    #[test]
    fn separate_providers_are_independent() {
        let a = CacheProvider::default();
        let b = CacheProvider::default();
        a.cache().add("mew", item("mew", 100));
        assert!(b.cache().state().is_empty());

        a.dispose();
        assert!(!a.0.scope().is_live());
    }
}
