//! Translation providers and the fallback chain.

pub mod google;
pub mod libre;
pub mod registry;
pub mod traits;

pub use google::{DEFAULT_GOOGLE_ENDPOINT, GoogleTranslateClient};
pub use libre::{DEFAULT_LIBRE_ENDPOINT, LibreTranslateClient};
pub use registry::{FallbackState, ProviderRegistry, ProviderTranslation};
pub use traits::TranslationProvider;
