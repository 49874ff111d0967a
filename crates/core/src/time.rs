//! Millisecond wall-clock helpers.
//!
//! Every validity field in the protocol is epoch milliseconds, so the whole
//! workspace reads the clock through here.

use chrono::Utc;

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Epoch milliseconds `millis` from now, saturating on overflow
pub fn millis_from_now(millis: i64) -> i64 {
    now_millis().saturating_add(millis)
}
