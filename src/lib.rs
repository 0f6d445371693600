//! Dragoman - offline-tolerant translation orchestration
//!
//! This crate turns a stream of text edits into debounced translation
//! requests, sends them down a ranked chain of providers (Google's `gtx`
//! endpoint, then LibreTranslate) and keeps working when the network does
//! not: every provider request passes through a [`RequestInterceptor`]
//! that answers from a versioned, persistent response cache or synthesizes
//! an offline reply.
//!
//! # Example
//!
//! ```rust,no_run
//! use dragoman::{Config, Dragoman, LanguageCode};
//!
//! #[tokio::main]
//! async fn main() -> dragoman::Result<()> {
//!     let translator = Dragoman::builder()
//!         .config(Config::load_or_default(None)?)
//!         .build()
//!         .await?;
//!
//!     match translator
//!         .translate("مرحبا", &LanguageCode::arabic(), &LanguageCode::amharic())
//!         .await
//!     {
//!         Ok(result) => println!("{} (via {})", result.text, result.provider_used),
//!         Err(e) => eprintln!("{}", e.user_message()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Sessions
//!
//! Interactive front ends feed [`InputEvent`]s into a [`Session`], which
//! applies the debounce policy and emits [`SessionOutput`]s:
//!
//! ```rust,ignore
//! let (tx, mut rx) = tokio::sync::mpsc::channel(16);
//! let events = tokio_stream::iter([InputEvent::TextChanged { text: "hello".into() }]);
//! tokio::spawn(translator.session().run(events, tx));
//! while let Some(output) = rx.recv().await { /* render */ }
//! ```

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod http;
pub mod interceptor;
pub mod providers;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use config::Config;
pub use dispatcher::{Dispatcher, InputEvent, Session, SessionOutput};
pub use error::{DragomanError, ErrorKind, Result, TranslationError};
pub use gateway::{Dragoman, DragomanBuilder};
pub use http::{Connectivity, HttpRequest, HttpResponse, Transport};
pub use interceptor::{RequestClass, RequestInterceptor};
pub use providers::{ProviderRegistry, TranslationProvider};
pub use store::{MemoryStore, PersistentStore, RedbStore};
pub use version::{PKG_NAME, PKG_VERSION, version_string};

// Re-export all types
pub use types::{
    DispatchState, HistoryEntry, LanguageCode, LanguageSlot, Theme, TranslationRequest,
    TranslationResult,
};
