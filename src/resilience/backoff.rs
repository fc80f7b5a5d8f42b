//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Calculate exponential backoff delay with jitter.
///
/// `attempt` is 1-based; attempt 0 yields no delay.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let Some(exponent) = attempt.checked_sub(1) else {
        return Duration::ZERO;
    };

    let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
    let delay_ms = base_ms.saturating_mul(factor).min(max_ms);

    // Up to 10% on top of the capped delay.
    let jitter_ms = rand::thread_rng().gen_range(0..=delay_ms / 10);
    Duration::from_millis(delay_ms.saturating_add(jitter_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let b1 = calculate_backoff(1, 100, 2000);
        assert!(b1.as_millis() >= 100 && b1.as_millis() <= 110);

        let b2 = calculate_backoff(2, 100, 2000);
        assert!(b2.as_millis() >= 200);

        let max = calculate_backoff(10, 100, 1000);
        assert!(max.as_millis() >= 1000 && max.as_millis() <= 1100);
    }

    #[test]
    fn test_zero_attempt_and_zero_base() {
        assert_eq!(calculate_backoff(0, 100, 1000), Duration::ZERO);
        assert_eq!(calculate_backoff(5, 0, 1000), Duration::ZERO);
    }

    #[test]
    fn test_shift_past_width_is_capped() {
        for attempt in [64, 65, u32::MAX] {
            let d = calculate_backoff(attempt, 1, 300);
            assert!(d.as_millis() >= 300 && d.as_millis() <= 330);
        }
    }

    #[test]
    fn test_large_attempt_saturates() {
        let d = calculate_backoff(200, u64::MAX, 5000);
        assert!(d.as_millis() >= 5000);
    }
}
