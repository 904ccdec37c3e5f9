//! Small numeric/time helpers for dosim_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Round to `decimals` fractional digits. Telemetry presentation precision
/// only; internal state is never rounded.
#[inline]
pub fn round_dp(x: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (x * scale).round() / scale
}

/// Tick period in whole milliseconds for a period given in seconds.
/// - Non-finite or negative periods map to 0.
/// - Sub-millisecond periods round to at least 1 ms.
#[inline]
pub fn period_ms(period_s: f64) -> u64 {
    if !period_s.is_finite() || period_s <= 0.0 {
        return 0;
    }
    ((period_s * MILLIS_PER_SEC as f64).round() as u64).max(1)
}
