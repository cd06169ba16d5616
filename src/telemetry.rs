//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `realm_greetings_`. Counters end in
//! `_total`, histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `cache`: which cache layer: "realm" or "greeting"
//! - `status`: outcome: "ok" or "error"

/// Total greeting lookups served through [`Greetings`](crate::Greetings).
///
/// Labels: `status` ("ok" | "error").
pub const LOOKUPS_TOTAL: &str = "realm_greetings_lookups_total";

/// Total cache hits.
///
/// Labels: `cache`.
pub const CACHE_HITS_TOTAL: &str = "realm_greetings_cache_hits_total";

/// Total cache misses (each miss runs, or joins, a loader).
///
/// Labels: `cache`.
pub const CACHE_MISSES_TOTAL: &str = "realm_greetings_cache_misses_total";

/// Total requests sent to a greeting service.
///
/// Labels: `status` ("ok" | "error").
pub const REMOTE_REQUESTS_TOTAL: &str = "realm_greetings_remote_requests_total";

/// Greeting service request duration in seconds.
pub const REMOTE_REQUEST_DURATION_SECONDS: &str = "realm_greetings_remote_request_duration_seconds";
