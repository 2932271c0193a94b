//! # Media queries
//!
//! [`MediaEnvironment`] stands in for the host's viewport: it evaluates
//! width queries and broadcasts changes to every live [`MediaQueryList`].
//! [`use_media`] observes one query from inside a component.
//!
//! Only `(min-width: Npx)` and `(max-width: Npx)` clauses joined by `and`
//! are understood. A query that does not parse never matches.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::str::FromStr;

use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::debug::use_debug_value;
use crate::effects::{on_unmount, use_effect};
use crate::reducer::use_state;

new_key_type! {
    pub struct ListenerId;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaQueryError {
    #[error("empty media query")]
    Empty,
    #[error("unsupported media feature `{0}`")]
    UnsupportedFeature(String),
    #[error("malformed clause `{0}`")]
    Malformed(String),
}

/// Conjunction of width bounds, both inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MediaCondition {
    pub min_width: Option<u32>,
    pub max_width: Option<u32>,
}

impl MediaCondition {
    pub fn matches(&self, width: u32) -> bool {
        self.min_width.is_none_or(|min| width >= min) && self.max_width.is_none_or(|max| width <= max)
    }
}

impl FromStr for MediaCondition {
    type Err = MediaQueryError;

    fn from_str(query: &str) -> Result<Self, Self::Err> {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return Err(MediaQueryError::Empty);
        }
        let mut condition = MediaCondition::default();
        for clause in query.split(" and ") {
            let clause = clause.trim();
            let body = clause
                .strip_prefix('(')
                .and_then(|c| c.strip_suffix(')'))
                .ok_or_else(|| MediaQueryError::Malformed(clause.to_string()))?;
            let (feature, value) = body
                .split_once(':')
                .ok_or_else(|| MediaQueryError::Malformed(clause.to_string()))?;
            let px = value
                .trim()
                .strip_suffix("px")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .ok_or_else(|| MediaQueryError::Malformed(clause.to_string()))?;
            match feature.trim() {
                "min-width" => condition.min_width = Some(px),
                "max-width" => condition.max_width = Some(px),
                other => return Err(MediaQueryError::UnsupportedFeature(other.to_string())),
            }
        }
        Ok(condition)
    }
}

type Listener = Rc<dyn Fn(bool)>;

struct ListInner {
    query: String,
    condition: Option<MediaCondition>,
    matches: Cell<bool>,
    listeners: RefCell<SlotMap<ListenerId, Listener>>,
}

/// Observation of one query: its current match and its change listeners.
#[derive(Clone)]
pub struct MediaQueryList {
    inner: Rc<ListInner>,
}

impl MediaQueryList {
    pub fn query(&self) -> &str {
        &self.inner.query
    }

    pub fn matches(&self) -> bool {
        self.inner.matches.get()
    }

    pub fn add_listener(&self, f: impl Fn(bool) + 'static) -> ListenerId {
        let id = self.inner.listeners.borrow_mut().insert(Rc::new(f));
        log::trace!("media '{}': listener added", self.inner.query);
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.inner.listeners.borrow_mut().remove(id).is_some();
        log::trace!("media '{}': listener removed ({removed})", self.inner.query);
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl ListInner {
    fn evaluate(&self, width: u32) -> bool {
        self.condition.is_some_and(|c| c.matches(width))
    }

    fn update(&self, width: u32) {
        let now = self.evaluate(width);
        if now == self.matches.replace(now) {
            return;
        }
        let listeners: Vec<Listener> = self.listeners.borrow().values().cloned().collect();
        for listener in listeners {
            listener(now);
        }
    }
}

struct EnvInner {
    width: u32,
    lists: Vec<Weak<ListInner>>,
}

/// The viewport all media queries are evaluated against.
#[derive(Clone)]
pub struct MediaEnvironment {
    inner: Rc<RefCell<EnvInner>>,
}

impl MediaEnvironment {
    pub fn new(width: u32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(EnvInner {
                width,
                lists: Vec::new(),
            })),
        }
    }

    pub fn width(&self) -> u32 {
        self.inner.borrow().width
    }

    pub fn match_media(&self, query: &str) -> MediaQueryList {
        let condition = match query.parse::<MediaCondition>() {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("media: `{query}` never matches: {e}");
                None
            }
        };
        let mut env = self.inner.borrow_mut();
        let list = Rc::new(ListInner {
            query: query.to_string(),
            condition,
            matches: Cell::new(false),
            listeners: RefCell::new(SlotMap::with_key()),
        });
        list.matches.set(list.evaluate(env.width));
        env.lists.retain(|l| l.strong_count() > 0);
        env.lists.push(Rc::downgrade(&list));
        MediaQueryList { inner: list }
    }

    /// Listeners attached across every live query list.
    pub fn listener_count(&self) -> usize {
        let env = self.inner.borrow();
        env.lists
            .iter()
            .filter_map(Weak::upgrade)
            .map(|l| l.listeners.borrow().len())
            .sum()
    }

    /// Changes the viewport; lists whose match flipped notify their listeners.
    pub fn resize(&self, width: u32) {
        let lists: Vec<Rc<ListInner>> = {
            let mut env = self.inner.borrow_mut();
            env.width = width;
            env.lists.retain(|l| l.strong_count() > 0);
            env.lists.iter().filter_map(Weak::upgrade).collect()
        };
        log::debug!("media: resized to {width}px ({} live queries)", lists.len());
        for list in lists {
            list.update(width);
        }
    }
}

/// Whether `query` currently matches, tracked for the lifetime of the caller.
///
/// The current value is read when the subscription starts; later changes
/// arrive through a listener that is removed again on teardown or when
/// `query` changes.
pub fn use_media(env: &MediaEnvironment, query: &str, initial: bool) -> bool {
    let (state, set_state) = use_state(|| initial);
    use_debug_value((query, state), |(query, state)| format!("`{query}` => {state}"));

    let env = env.clone();
    let owned_query = query.to_string();
    use_effect(owned_query.clone(), move || {
        let active = Rc::new(Cell::new(true));
        let mql = env.match_media(&owned_query);
        let id = {
            let active = active.clone();
            let set_state = set_state.clone();
            mql.add_listener(move |matches| {
                if !active.get() {
                    return;
                }
                set_state.set(matches);
            })
        };
        set_state.set(mql.matches());

        on_unmount(move || {
            active.set(false);
            mql.remove_listener(id);
        })
    });

    state
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_width_clauses() {
        let c: MediaCondition = "(max-width: 999px) and (min-width: 700px)".parse().unwrap();
        assert_eq!(c.min_width, Some(700));
        assert_eq!(c.max_width, Some(999));
        assert!(c.matches(700) && c.matches(999));
        assert!(!c.matches(699) && !c.matches(1000));
    }

    #[test]
    fn rejects_unknown_queries() {
        assert_eq!("".parse::<MediaCondition>(), Err(MediaQueryError::Empty));
        assert!(matches!(
            "(orientation: 10px)".parse::<MediaCondition>(),
            Err(MediaQueryError::UnsupportedFeature(_))
        ));
        assert!(matches!(
            "min-width: 10px".parse::<MediaCondition>(),
            Err(MediaQueryError::Malformed(_))
        ));
    }

    #[test]
    fn resize_notifies_only_on_flip() {
        let env = MediaEnvironment::new(500);
        let mql = env.match_media("(min-width: 1000px)");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        mql.add_listener(move |m| s.borrow_mut().push(m));

        env.resize(800);
        env.resize(1200);
        env.resize(1300);
        env.resize(400);
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(!mql.matches());
    }

    #[test]
    fn unparseable_query_never_matches() {
        let env = MediaEnvironment::new(500);
        let mql = env.match_media("(prefers-color-scheme: dark)");
        env.resize(5000);
        assert!(!mql.matches());
    }
}
