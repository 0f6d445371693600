//! Caching subsystem.
//!
//! [`CacheManager`] owns two named regions, one for static assets and one
//! for translation API responses. Region names carry a generation tag
//! ([`CacheConfig::version`]); opening the manager deletes every region of
//! any other generation, which is the only way the cache as a whole is
//! invalidated.
//!
//! The policy deciding *when* each region is read or written lives in
//! [`RequestInterceptor`](crate::interceptor::RequestInterceptor).

mod config;
mod manager;

pub use config::{CacheConfig, CacheRegion, DEFAULT_API_TTL, DEFAULT_CACHE_VERSION};
pub use manager::{CacheEntry, CacheManager};
