//! Time calculation utilities shared by the renderers
//!
//! Time is measured on the host clock as a `Duration` since the host origin.

use std::time::Duration;

/// Progress (0.0 to 1.0) of an animation that has been running for `elapsed`
///
/// A zero duration is complete immediately.
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Milliseconds as a `Duration`; negative and non-finite input becomes zero
#[inline]
pub fn millis(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_nanos((ms * 1_000_000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

/// A `Duration` as fractional milliseconds
#[inline]
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

/// Start offset of character `index` in a staggered reveal
#[inline]
pub fn char_delay(delay: Duration, stagger: Duration, index: usize) -> Duration {
    delay + stagger * index as u32
}

/// Time between typed characters: the stagger if set, otherwise the
/// duration spread evenly over the characters
///
/// Returns `None` for empty text.
pub fn per_char_interval(duration: Duration, stagger: Duration, char_count: usize) -> Option<Duration> {
    if char_count == 0 {
        return None;
    }
    if !stagger.is_zero() {
        Some(stagger)
    } else {
        Some(duration / char_count as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_zero_duration() {
        assert!((progress(Duration::ZERO, Duration::ZERO) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_clamps() {
        let d = Duration::from_millis(1000);
        assert!((progress(Duration::from_millis(500), d) - 0.5).abs() < 1e-9);
        assert!((progress(Duration::from_millis(5000), d) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_millis_conversions() {
        assert_eq!(millis(250.0), Duration::from_millis(250));
        assert_eq!(millis(-5.0), Duration::ZERO);
        assert_eq!(millis(f64::NAN), Duration::ZERO);
        assert!((as_millis_f64(Duration::from_millis(42)) - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_char_delay() {
        let d = char_delay(Duration::from_millis(100), Duration::from_millis(30), 3);
        assert_eq!(d, Duration::from_millis(190));
    }

    #[test]
    fn test_per_char_interval() {
        let second = Duration::from_millis(1000);
        assert_eq!(per_char_interval(second, Duration::ZERO, 4), Some(Duration::from_millis(250)));
        assert_eq!(
            per_char_interval(second, Duration::from_millis(50), 4),
            Some(Duration::from_millis(50))
        );
        assert_eq!(per_char_interval(second, Duration::ZERO, 0), None);
    }
}
