//! Public types for the Dragoman API.

mod history;
mod language;
mod theme;
mod translation;

pub use history::{DEFAULT_MAX_HISTORY_ITEMS, HistoryEntry};
pub use language::{LanguageCode, LanguageSlot};
pub use theme::Theme;
pub use translation::{
    DEFAULT_MAX_TEXT_LENGTH, DispatchState, TranslationRequest, TranslationResult,
};
