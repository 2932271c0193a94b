//! Lifecycle of one unit of asynchronous work.
//!
//! ```rust
//! use statehooks_core::async_state::{AsyncAction, AsyncState, reduce};
//!
//! let idle: AsyncState<u32, String> = AsyncState::Idle;
//! let pending = reduce(&idle, AsyncAction::Pending);
//! let done = reduce(&pending, AsyncAction::Resolved(35));
//! assert_eq!(done.data(), Some(&35));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::HookError;

/// The four lifecycle tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AsyncStatus {
    Idle,
    Pending,
    Resolved,
    Rejected,
}

impl AsyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AsyncStatus::Idle => "idle",
            AsyncStatus::Pending => "pending",
            AsyncStatus::Resolved => "resolved",
            AsyncStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for AsyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the tags produced by `as_str`. Any other tag is a state the
/// reducer can never produce.
impl FromStr for AsyncStatus {
    type Err = HookError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "idle" => Ok(AsyncStatus::Idle),
            "pending" => Ok(AsyncStatus::Pending),
            "resolved" => Ok(AsyncStatus::Resolved),
            "rejected" => Ok(AsyncStatus::Rejected),
            other => Err(HookError::Unreachable {
                context: format!("unhandled status: {other}"),
            }),
        }
    }
}

/// Status plus payload. Only `Resolved` carries data and only `Rejected` carries an error.
#[derive(Clone, Debug, PartialEq)]
pub enum AsyncState<T, E> {
    Idle,
    Pending,
    Resolved(T),
    Rejected(E),
}

impl<T, E> Default for AsyncState<T, E> {
    fn default() -> Self {
        AsyncState::Idle
    }
}

/// Transitions accepted by [`reduce`].
#[derive(Clone, Debug, PartialEq)]
pub enum AsyncAction<T, E> {
    Pending,
    Resolved(T),
    Rejected(E),
}

impl<T, E> AsyncAction<T, E> {
    pub fn status(&self) -> AsyncStatus {
        match self {
            AsyncAction::Pending => AsyncStatus::Pending,
            AsyncAction::Resolved(_) => AsyncStatus::Resolved,
            AsyncAction::Rejected(_) => AsyncStatus::Rejected,
        }
    }
}

impl<T, E> From<Result<T, E>> for AsyncAction<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => AsyncAction::Resolved(data),
            Err(error) => AsyncAction::Rejected(error),
        }
    }
}

impl<T, E> AsyncState<T, E> {
    /// `Pending` when work starts right away, otherwise `Idle`.
    pub fn initial(starts_immediately: bool) -> Self {
        if starts_immediately {
            AsyncState::Pending
        } else {
            AsyncState::Idle
        }
    }

    pub fn status(&self) -> AsyncStatus {
        match self {
            AsyncState::Idle => AsyncStatus::Idle,
            AsyncState::Pending => AsyncStatus::Pending,
            AsyncState::Resolved(_) => AsyncStatus::Resolved,
            AsyncState::Rejected(_) => AsyncStatus::Rejected,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, AsyncState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncState::Pending)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, AsyncState::Resolved(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, AsyncState::Rejected(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AsyncState::Resolved(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            AsyncState::Rejected(error) => Some(error),
            _ => None,
        }
    }
}

/// Full replacement of the status slice; the previous payload is never merged.
pub fn reduce<T, E>(_state: &AsyncState<T, E>, action: AsyncAction<T, E>) -> AsyncState<T, E> {
    match action {
        AsyncAction::Pending => AsyncState::Pending,
        AsyncAction::Resolved(data) => AsyncState::Resolved(data),
        AsyncAction::Rejected(error) => AsyncState::Rejected(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = AsyncState<u32, String>;
    type Action = AsyncAction<u32, String>;

    #[test]
    fn action_tag_decides_next_state() {
        let states: [State; 4] = [
            AsyncState::Idle,
            AsyncState::Pending,
            AsyncState::Resolved(1),
            AsyncState::Rejected("boom".into()),
        ];
        for s in &states {
            assert_eq!(reduce(s, Action::Pending), AsyncState::Pending);
            assert_eq!(reduce(s, Action::Resolved(7)), AsyncState::Resolved(7));
            assert_eq!(
                reduce(s, Action::Rejected("nope".into())),
                AsyncState::Rejected("nope".into())
            );
        }
    }

    #[test]
    fn resolving_twice_is_idempotent() {
        let once = reduce(&State::Idle, Action::Resolved(35));
        let twice = reduce(&once, Action::Resolved(35));
        assert_eq!(once, twice);
    }

    #[test]
    fn pending_discards_previous_payload() {
        let s = reduce(&State::Resolved(3), Action::Pending);
        assert_eq!(s.data(), None);
        assert_eq!(s.error(), None);
        assert_eq!(s.status(), AsyncStatus::Pending);
    }

    #[test]
    fn initial_state_follows_whether_work_starts() {
        assert!(State::initial(true).is_pending());
        assert!(State::initial(false).is_idle());
        assert!(State::default().is_idle());
    }

    #[test]
    fn status_tags_parse_back() {
        for status in [
            AsyncStatus::Idle,
            AsyncStatus::Pending,
            AsyncStatus::Resolved,
            AsyncStatus::Rejected,
        ] {
            assert_eq!(status.to_string().parse::<AsyncStatus>(), Ok(status));
        }
        let err = "loading".parse::<AsyncStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unreachable state: unhandled status: loading");
        assert!(reduce(&State::Pending, Action::Resolved(1)).is_resolved());
    }
}
