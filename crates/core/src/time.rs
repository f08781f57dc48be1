//! Duration helpers for millisecond-granular settings

use std::time::Duration;

/// Whole milliseconds in `duration`, rounded up and saturating at `u64::MAX`
///
/// A non-zero duration never maps to 0.
pub fn millis_ceil(duration: Duration) -> u64 {
    let mut millis = duration.as_millis();
    if duration.subsec_nanos() % 1_000_000 != 0 {
        millis += 1;
    }
    u64::try_from(millis).unwrap_or(u64::MAX)
}
