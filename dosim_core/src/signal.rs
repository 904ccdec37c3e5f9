//! Analog signal synthesis and the 1-5 V transducer mappings.

use rand::Rng;

/// Lower bound of the analog transducer range, volts.
pub const VOLTS_MIN: f64 = 1.0;
/// Upper bound of the analog transducer range, volts.
pub const VOLTS_MAX: f64 = 5.0;
const VOLTS_SPAN: f64 = VOLTS_MAX - VOLTS_MIN;

/// Advance a bounded random walk: add a uniform perturbation in
/// `[-step_bound_v, +step_bound_v]` to the previous reading, then clamp to
/// the transducer range. Pure in the carried value plus one random draw.
pub fn advance_volts<R: Rng + ?Sized>(rng: &mut R, prev_volts: f64, step_bound_v: f64) -> f64 {
    let step = if step_bound_v > 0.0 {
        rng.gen_range(-step_bound_v..=step_bound_v)
    } else {
        0.0
    };
    (prev_volts + step).clamp(VOLTS_MIN, VOLTS_MAX)
}

/// Linear 1-5 V to 0..span mapping. Readings below 1 V (which cannot occur
/// after clamping) floor at zero flow.
#[inline]
pub fn to_flow_m3min(volts: f64, span_m3min: f64) -> f64 {
    (((volts - VOLTS_MIN) / VOLTS_SPAN) * span_m3min).max(0.0)
}

/// Inverse transducer mapping for the tank level signal:
/// 0 % -> 1 V, 100 % -> 5 V.
#[inline]
pub fn level_volts(level_pct: f64) -> f64 {
    VOLTS_MIN + VOLTS_SPAN * level_pct.clamp(0.0, 100.0) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn walk_stays_within_transducer_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut v = 4.95;
        for _ in 0..10_000 {
            v = advance_volts(&mut rng, v, 0.5);
            assert!((VOLTS_MIN..=VOLTS_MAX).contains(&v), "escaped range: {v}");
        }
    }

    #[test]
    fn zero_step_bound_is_a_fixed_point() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(advance_volts(&mut rng, 2.8, 0.0), 2.8);
    }

    #[test]
    fn flow_mapping_endpoints() {
        assert_eq!(to_flow_m3min(1.0, 30.0), 0.0);
        assert_eq!(to_flow_m3min(5.0, 30.0), 30.0);
        assert_eq!(to_flow_m3min(3.0, 30.0), 15.0);
        // Below the transducer floor the flow is defined as zero.
        assert_eq!(to_flow_m3min(0.5, 30.0), 0.0);
    }

    #[test]
    fn level_mapping_is_the_inverse_convention() {
        assert_eq!(level_volts(0.0), 1.0);
        assert_eq!(level_volts(100.0), 5.0);
        assert_eq!(level_volts(50.0), 3.0);
        // Out-of-range percent clamps instead of extrapolating.
        assert_eq!(level_volts(150.0), 5.0);
        assert_eq!(level_volts(-5.0), 1.0);
    }

    #[test]
    fn mappings_are_idempotent_on_same_input() {
        for _ in 0..3 {
            assert_eq!(to_flow_m3min(2.62, 30.0), to_flow_m3min(2.62, 30.0));
            assert_eq!(level_volts(41.7), level_volts(41.7));
        }
    }
}
