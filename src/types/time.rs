//! Epoch-millisecond clock helpers

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as milliseconds since epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Seconds elapsed since an epoch-millisecond timestamp
pub fn seconds_since(timestamp_ms: u64) -> f64 {
    now_millis().saturating_sub(timestamp_ms) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_recent() {
        // Anything after 2020-01-01 counts as a sane clock
        assert!(now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_seconds_since() {
        let t = now_millis();
        assert!(seconds_since(t) < 1.0);
        assert!(seconds_since(t.saturating_sub(2_000)) >= 2.0);
    }
}
