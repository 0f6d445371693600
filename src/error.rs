//! Dragoman error types

use std::fmt;
use std::time::Duration;

/// Dragoman error types
#[derive(Debug, thiserror::Error)]
pub enum DragomanError {
    // Input errors
    #[error("nothing to translate")]
    EmptyText,

    #[error("text too long: {len} characters (max {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Provider/network errors
    #[error("network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("no network connectivity")]
    Offline,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("empty translation returned by provider")]
    EmptyResponse,

    /// Every provider in the fallback chain failed.
    #[error("all providers exhausted (last error: {last})")]
    AllProvidersExhausted { last: Box<DragomanError> },

    #[error("no provider configured")]
    NoProvider,

    /// A newer request was dispatched before this one resolved.
    #[error("request {request_id} superseded by a newer request")]
    Superseded { request_id: u64 },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl DragomanError {
    /// Whether the next provider in the fallback chain should be tried.
    ///
    /// Client-side validation failures stop the chain: another provider
    /// would reject the same input.
    pub fn is_fallback_trigger(&self) -> bool {
        !matches!(
            self,
            DragomanError::EmptyText
                | DragomanError::TextTooLong { .. }
                | DragomanError::InvalidInput(_)
                | DragomanError::Configuration(_)
        )
    }

    /// The `Retry-After` hint carried by a rate-limit error, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            DragomanError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DragomanError {
    fn from(err: reqwest::Error) -> Self {
        DragomanError::Network(err.to_string())
    }
}

impl From<redb::Error> for DragomanError {
    fn from(err: redb::Error) -> Self {
        DragomanError::Store(err.to_string())
    }
}

/// Result type alias for Dragoman operations
pub type Result<T> = std::result::Result<T, DragomanError>;

/// User-facing classification of a failed translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyText,
    TextTooLong,
    AllProvidersExhausted,
    Offline,
    RateLimited,
    NetworkError,
    MalformedResponse,
    /// The result arrived after a newer request was issued and was dropped.
    Superseded,
    Internal,
}

impl ErrorKind {
    /// Classify a crate error.
    ///
    /// An exhausted chain surfaces its last cause when that cause has a
    /// more specific message (rate limiting, connectivity).
    pub fn of(err: &DragomanError) -> Self {
        match err {
            DragomanError::EmptyText => ErrorKind::EmptyText,
            DragomanError::TextTooLong { .. } => ErrorKind::TextTooLong,
            DragomanError::Offline => ErrorKind::Offline,
            DragomanError::RateLimited { .. } => ErrorKind::RateLimited,
            DragomanError::Network(_) => ErrorKind::NetworkError,
            DragomanError::MalformedResponse(_) | DragomanError::EmptyResponse => {
                ErrorKind::MalformedResponse
            }
            DragomanError::Superseded { .. } => ErrorKind::Superseded,
            DragomanError::AllProvidersExhausted { last } => match ErrorKind::of(last) {
                kind @ (ErrorKind::RateLimited | ErrorKind::Offline) => kind,
                _ => ErrorKind::AllProvidersExhausted,
            },
            _ => ErrorKind::Internal,
        }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::EmptyText => "Please enter some text to translate.",
            ErrorKind::TextTooLong => "The text is too long to translate.",
            ErrorKind::AllProvidersExhausted => {
                "An error occurred while translating. Please try again."
            }
            ErrorKind::Offline => "Please check your internet connection and try again.",
            ErrorKind::RateLimited => "Too many requests. Please wait a moment and try again.",
            ErrorKind::NetworkError => {
                "A connection error occurred. Please check your internet connection and try again."
            }
            ErrorKind::MalformedResponse => "The translation service returned an unreadable reply.",
            ErrorKind::Superseded => "The translation was replaced by a newer request.",
            ErrorKind::Internal => "An unexpected error occurred.",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::EmptyText => "empty text",
            ErrorKind::TextTooLong => "text too long",
            ErrorKind::AllProvidersExhausted => "all providers exhausted",
            ErrorKind::Offline => "offline",
            ErrorKind::RateLimited => "rate limited",
            ErrorKind::NetworkError => "network error",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::Superseded => "superseded",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(name)
    }
}

/// A failed translation as reported to the rendering collaborator.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {source}")]
pub struct TranslationError {
    pub kind: ErrorKind,
    #[source]
    pub source: DragomanError,
}

impl TranslationError {
    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

impl From<DragomanError> for TranslationError {
    fn from(source: DragomanError) -> Self {
        Self {
            kind: ErrorKind::of(&source),
            source,
        }
    }
}
