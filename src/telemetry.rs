//! Telemetry metric name constants.
//!
//! Centralised metric names for dragoman operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `dragoman_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider name (e.g. "google", "libretranslate")
//! - `status`: outcome, "ok" or "error"
//! - `region`: cache region, "static" or "api"

/// Total translation requests sent through the provider chain.
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "dragoman_requests_total";

/// Request duration in seconds, measured across the whole chain.
///
/// Labels: `provider`.
pub const REQUEST_DURATION_SECONDS: &str = "dragoman_request_duration_seconds";

/// Times the chain moved on to the next provider.
///
/// Labels: `provider` (the one that failed).
pub const FALLBACKS_TOTAL: &str = "dragoman_fallbacks_total";

/// Total cache hits.
///
/// Labels: `region`.
pub const CACHE_HITS_TOTAL: &str = "dragoman_cache_hits_total";

/// Total cache misses (including expired entries).
///
/// Labels: `region`.
pub const CACHE_MISSES_TOTAL: &str = "dragoman_cache_misses_total";

/// Responses synthesized by the interceptor instead of reaching the network.
///
/// Labels: `reason` ("offline" | "network_failure").
pub const SYNTHESIZED_RESPONSES_TOTAL: &str = "dragoman_synthesized_responses_total";

/// Translation results discarded because a newer request was issued.
pub const SUPERSEDED_TOTAL: &str = "dragoman_superseded_total";
