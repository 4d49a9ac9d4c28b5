//! Thin wrapper around the `xxhash-rust` crate providing the XXH64 metric
//! identity hash.
//!
//! A metric's 64-bit id is `XXH64(name_bytes, seed 0)`. Only XXH64 is
//! needed; the codec has no other hashing concern.

/// Streaming XXH64 state, re-exported for callers that hash incrementally.
pub use xxhash_rust::xxh64::Xxh64 as Xxh64State;

/// 64-bit metric identifier, typically [`metric_id`] of the metric's name.
pub type MetricId = u64;

/// One-shot XXH64 hash.
///
/// # Parity vectors
/// * `xxh64_oneshot(b"", 0)` == `0xEF46_DB37_51D8_E999`
#[inline]
pub fn xxh64_oneshot(data: &[u8], seed: u64) -> u64 {
    xxhash_rust::xxh64::xxh64(data, seed)
}

/// Hash a metric name to its wire identity (XXH64, seed 0).
#[inline]
pub fn metric_id(name: &str) -> MetricId {
    xxh64_oneshot(name.as_bytes(), 0)
}
