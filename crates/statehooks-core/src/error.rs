use thiserror::Error;

/// Misuse of the hook runtime. Always a programming or wiring error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("{hook} must be used within a {provider}")]
    MissingProvider {
        hook: &'static str,
        provider: &'static str,
    },
    #[error("unreachable state: {context}")]
    Unreachable { context: String },
}

/// Failure of the mocked item source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("no item named \"{name}\"")]
    NotFound { name: String },
    #[error("network error: {message}")]
    Network { message: String },
    #[error("malformed item data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Malformed(e.to_string())
    }
}

/// Why a component could not produce a view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
