use rand::Rng;
use std::time::Duration;

/// Exponential backoff with ±30% jitter for re-reading a failed page.
pub fn calculate_backoff_delay(attempt: u32, base_delay_ms: u64) -> Duration {
    // Cap the exponent so the delay stays bounded
    let capped_attempt = attempt.min(10);

    let base_delay = base_delay_ms.saturating_mul(2_u64.saturating_pow(capped_attempt));

    let jitter_factor = rand::thread_rng().gen_range(0.7..1.3);
    let delay_with_jitter = (base_delay as f64 * jitter_factor).round() as u64;

    Duration::from_millis(delay_with_jitter)
}
