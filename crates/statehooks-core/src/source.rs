use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::deferred::Deferred;
use crate::error::FetchError;
use crate::event_loop::EventLoop;

const BUNDLED_DB: &str = include_str!("../data/pokemon.json");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub damage: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub number: u32,
    pub hp: u32,
    pub image_url: String,
    #[serde(default)]
    pub attacks: Vec<Attack>,
    /// Virtual time at which the item was served, in milliseconds.
    #[serde(default)]
    pub fetched_at_ms: Option<u64>,
}

/// Anything that can look an item up by name, later.
pub trait ItemSource {
    fn fetch(&self, name: &str) -> Deferred<Item, FetchError>;
}

/// Knobs for [`MockPokemonApi`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchConfig {
    /// Virtual time between issuing a fetch and its completion.
    pub latency: Duration,
    /// Names that always fail with a network error.
    pub failing: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(1500),
            failing: Vec::new(),
        }
    }
}

impl FetchConfig {
    pub fn instant() -> Self {
        Self {
            latency: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn slow() -> Self {
        Self {
            latency: Duration::from_millis(4000),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn failing_on(mut self, name: impl Into<String>) -> Self {
        self.failing.push(normalize(&name.into()));
        self
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Serves the bundled JSON database on an [`EventLoop`].
#[derive(Clone)]
pub struct MockPokemonApi {
    event_loop: EventLoop,
    config: FetchConfig,
    db: Rc<HashMap<String, Item>>,
    fetches: Rc<Cell<usize>>,
}

impl MockPokemonApi {
    pub fn new(event_loop: EventLoop, config: FetchConfig) -> Result<Self, FetchError> {
        Self::from_json(event_loop, config, BUNDLED_DB)
    }

    pub fn from_json(event_loop: EventLoop, config: FetchConfig, json: &str) -> Result<Self, FetchError> {
        let items: Vec<Item> = serde_json::from_str(json)?;
        let db = items
            .into_iter()
            .map(|item| (normalize(&item.name), item))
            .collect::<HashMap<_, _>>();
        log::debug!("mock api: {} item(s) loaded", db.len());
        Ok(Self {
            event_loop,
            config,
            db: Rc::new(db),
            fetches: Rc::new(Cell::new(0)),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches issued so far (including failing ones).
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.db.keys().cloned().collect();
        names.sort();
        names
    }

    fn lookup(&self, key: &str) -> Result<Item, FetchError> {
        if self.config.failing.iter().any(|f| f == key) {
            return Err(FetchError::Network {
                message: format!("request for \"{key}\" failed"),
            });
        }
        let mut item = self
            .db
            .get(key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                name: key.to_string(),
            })?;
        let served_at = self.event_loop.now() + self.config.latency;
        item.fetched_at_ms = Some(served_at.as_millis() as u64);
        Ok(item)
    }
}

impl ItemSource for MockPokemonApi {
    fn fetch(&self, name: &str) -> Deferred<Item, FetchError> {
        self.fetches.set(self.fetches.get() + 1);
        let key = normalize(name);
        log::debug!("mock api: fetch #{} for '{key}'", self.fetches.get());
        let outcome = self.lookup(&key);
        self.event_loop.delay(outcome, self.config.latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn bundled_db_parses() {
        let api = MockPokemonApi::new(EventLoop::new(), FetchConfig::default()).unwrap();
        assert!(api.names().contains(&"pikachu".to_string()));
    }

    #[test]
    fn fetch_settles_after_latency() {
        let ev = EventLoop::new();
        let api = MockPokemonApi::new(ev.clone(), FetchConfig::default().with_latency(Duration::from_millis(100)))
            .unwrap();
        let got = Rc::new(RefCell::new(None));
        let g = got.clone();
        api.fetch("  Pikachu ").then(move |item| *g.borrow_mut() = Some(item), |e| panic!("{e}"));

        ev.advance(Duration::from_millis(99));
        assert!(got.borrow().is_none());
        ev.advance(Duration::from_millis(1));
        let item = got.borrow_mut().take().unwrap();
        assert_eq!((item.name.as_str(), item.hp), ("pikachu", 35));
        assert_eq!(item.fetched_at_ms, Some(100));
        assert_eq!(api.fetch_count(), 1);
    }

    #[test]
    fn unknown_and_failing_names_reject() {
        let ev = EventLoop::new();
        let api = MockPokemonApi::new(ev.clone(), FetchConfig::instant().failing_on("mew")).unwrap();
        let errors = Rc::new(RefCell::new(Vec::new()));
        for name in ["missingno", "mew"] {
            let e = errors.clone();
            api.fetch(name).then(|_| panic!("resolved"), move |err| e.borrow_mut().push(err));
        }
        ev.run_until_idle();
        let errors = errors.borrow();
        assert!(matches!(&errors[0], FetchError::NotFound { name } if name == "missingno"));
        assert!(matches!(&errors[1], FetchError::Network { .. }));
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = MockPokemonApi::from_json(EventLoop::new(), FetchConfig::default(), "{").err();
        assert!(matches!(err, Some(FetchError::Malformed(_))));
    }
}
