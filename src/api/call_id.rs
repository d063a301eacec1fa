use std::sync::atomic::{AtomicU64, Ordering};

static LAST_CALL_ID: AtomicU64 = AtomicU64::new(0);

/// Identifier for the next API call
///
/// The current time in epoch milliseconds, or one more than the previous id
/// when the clock has not moved past it. Strictly increasing per process.
pub fn next_call_id() -> u64 {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let step = |last: u64| if now > last { now } else { last + 1 };
    let previous = LAST_CALL_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(step(last)))
        .unwrap_or_else(|last| last);
    step(previous)
}
