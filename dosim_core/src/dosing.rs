//! Required-vs-achieved dosing computation for the active pump.

use crate::config::ProcessCfg;
use crate::util::round_dp;
use rand::Rng;

/// Outcome of one tick of the dosing model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DosingOutcome {
    /// Stroke rate required to hold the concentration target, strokes/min.
    pub spm_theoretical: f64,
    /// Achieved stroke rate after noise and the mechanical ceiling.
    pub spm_actual: f64,
    /// True iff the pre-clamp achieved rate exceeded `max_spm`: the
    /// mechanical ceiling is suppressing correct dosing.
    pub under_limit: bool,
    /// QA coherence metric: 100 * |actual - theoretical| / theoretical,
    /// rounded to one decimal; 0 when the theoretical rate is 0.
    pub mismatch_pct: f64,
    /// Whole strokes issued this tick (fractional strokes are meaningless).
    pub pulses: u32,
}

/// Stroke rate required to dose `flow_m3min` of gas at the configured
/// concentration. Defined as 0 for degenerate displacement or density
/// (guard, not an error).
pub fn theoretical_spm(flow_m3min: f64, displacement_cm3: f64, process: &ProcessCfg) -> f64 {
    if displacement_cm3 <= 0.0 || process.density_g_cm3 <= 0.0 {
        return 0.0;
    }
    (flow_m3min * process.concentration_mg_m3) / (1000.0 * process.density_g_cm3 * displacement_cm3)
}

/// Run the dosing model for one tick: theoretical rate, multiplicative
/// noise, mechanical ceiling, and the integer pulse count for the period.
pub fn compute<R: Rng + ?Sized>(
    rng: &mut R,
    flow_m3min: f64,
    displacement_cm3: f64,
    period_s: f64,
    process: &ProcessCfg,
) -> DosingOutcome {
    let spm_theoretical = theoretical_spm(flow_m3min, displacement_cm3, process);

    let noise = process.noise_pct.max(0.0);
    let factor = if noise > 0.0 {
        1.0 + rng.gen_range(-noise..=noise)
    } else {
        1.0
    };
    let mut spm_actual = spm_theoretical * factor;

    let under_limit = spm_actual > process.max_spm;
    if under_limit {
        spm_actual = process.max_spm;
    }

    let mismatch_pct = if spm_theoretical == 0.0 {
        0.0
    } else {
        round_dp(
            100.0 * (spm_actual - spm_theoretical).abs() / spm_theoretical,
            1,
        )
    };

    let pulses = (spm_actual * period_s / 60.0).round().max(0.0) as u32;

    DosingOutcome {
        spm_theoretical,
        spm_actual,
        under_limit,
        mismatch_pct,
        pulses,
    }
}
