//! Debounced dispatch of translation requests.

pub mod debounce;
mod dispatch;
mod session;

pub use debounce::{DebounceAction, DebounceConfig, Debouncer};
pub use dispatch::Dispatcher;
pub use session::{InputEvent, Session, SessionOutput};
