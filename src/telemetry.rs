//! Telemetry metric name constants.
//!
//! Centralised metric names for scholia operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `scholia_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `style` — explanation style ("simple" | "technical")
//! - `status` — outcome: "ok" or "error"

/// Total explanation requests handled by the entry point.
///
/// Labels: `style`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "scholia_requests_total";

/// End-to-end request duration in seconds.
///
/// Labels: `style`.
pub const REQUEST_DURATION_SECONDS: &str = "scholia_request_duration_seconds";

/// Total retry attempts (not counting the initial dispatch).
///
/// Labels: `reason` ("transient" | "context_too_large").
pub const RETRIES_TOTAL: &str = "scholia_retries_total";

/// Total output-budget ladder rungs that failed before one succeeded.
pub const LADDER_FAILURES_TOTAL: &str = "scholia_ladder_failures_total";

/// Total explanation cache hits.
pub const CACHE_HITS_TOTAL: &str = "scholia_cache_hits_total";

/// Total explanation cache misses.
pub const CACHE_MISSES_TOTAL: &str = "scholia_cache_misses_total";
