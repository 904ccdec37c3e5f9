//! Injection-confirmation sensor: a digital input that should read `open`
//! (liquid detected) whenever the active pump is actually delivering.

use rand::Rng;
use serde::Serialize;

/// Wire state of the injection sensor contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorState {
    /// Contact open: liquid delivery confirmed (OK).
    Open,
    /// Contact closed: no detection (FAIL).
    Closed,
}

impl SensorState {
    #[inline]
    pub fn is_fail(self) -> bool {
        matches!(self, SensorState::Closed)
    }
}

/// Per-tick Bernoulli trial, independent across ticks and devices.
/// The probability is clamped into [0, 1] so a degenerate config cannot
/// panic the draw.
pub fn sample<R: Rng + ?Sized>(rng: &mut R, failure_probability: f64) -> SensorState {
    let p = if failure_probability.is_finite() {
        failure_probability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if rng.gen_bool(p) {
        SensorState::Closed
    } else {
        SensorState::Open
    }
}

/// Advance the no-detection accumulator.
///
/// FAIL or a zero-pulse tick grows the counter by this tick's pulse count
/// (possibly staying flat, never resetting); OK with at least one pulse
/// confirms delivery and resets it. The rotation policy consumes the result.
pub fn update_no_detect(count: u32, sensor: SensorState, pulses: u32) -> u32 {
    if sensor.is_fail() || pulses == 0 {
        count.saturating_add(pulses)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn extreme_probabilities_are_deterministic() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(sample(&mut rng, 0.0), SensorState::Open);
        assert_eq!(sample(&mut rng, 1.0), SensorState::Closed);
        // Out-of-range and non-finite inputs are guarded, not panics.
        assert_eq!(sample(&mut rng, -3.0), SensorState::Open);
        assert_eq!(sample(&mut rng, 2.0), SensorState::Closed);
        assert_eq!(sample(&mut rng, f64::NAN), SensorState::Open);
    }

    #[test]
    fn counter_grows_on_fail_and_on_idle_ticks() {
        assert_eq!(update_no_detect(3, SensorState::Closed, 2), 5);
        // Zero pulses keep the counter flat even when the sensor reads OK.
        assert_eq!(update_no_detect(3, SensorState::Open, 0), 3);
        assert_eq!(update_no_detect(0, SensorState::Closed, 0), 0);
    }

    #[test]
    fn counter_resets_on_confirmed_delivery() {
        assert_eq!(update_no_detect(4, SensorState::Open, 1), 0);
        assert_eq!(update_no_detect(u32::MAX, SensorState::Open, 7), 0);
    }

    #[test]
    fn two_unconfirmed_pulses_push_four_past_the_failover_threshold() {
        let count = update_no_detect(4, SensorState::Closed, 2);
        assert_eq!(count, 6);
        assert!(crate::rotation::evaluate(crate::rotation::Pump::A, count).is_some());
    }
}
