//! Core-owned configuration structs, decoupled from the file/env schema
//! crate. `conversions` bridges `dosim_config` types into these.

use crate::rotation::Pump;

/// Process and engineering constants shared by every simulated device.
#[derive(Debug, Clone)]
pub struct ProcessCfg {
    /// Gas flow at 5 V, m3/min (1-5 V maps linearly to 0..span).
    pub q_span_m3min: f64,
    /// Chemical concentration target in the gas, mg/m3.
    pub concentration_mg_m3: f64,
    /// Chemical density, g/cm3.
    pub density_g_cm3: f64,
    /// Pump A displacement, cm3 per stroke.
    pub displacement_a_cm3: f64,
    /// Pump B displacement, cm3 per stroke.
    pub displacement_b_cm3: f64,
    /// Tank capacity, litres.
    pub tank_capacity_l: f64,
    /// Mechanical stroke-rate ceiling, strokes/min.
    pub max_spm: f64,
    /// Per-tick probability that the injection sensor reports FAIL.
    pub sensor_fail_prob: f64,
    /// Multiplicative dosing noise magnitude (0.03 = +/-3%).
    pub noise_pct: f64,
    /// Flow random-walk step bound per tick, volts.
    pub flow_step_v: f64,
}

impl ProcessCfg {
    /// Displacement of the given pump, cm3 per stroke.
    #[inline]
    pub fn displacement_cm3(&self, pump: Pump) -> f64 {
        match pump {
            Pump::A => self.displacement_a_cm3,
            Pump::B => self.displacement_b_cm3,
        }
    }
}

impl Default for ProcessCfg {
    fn default() -> Self {
        Self {
            q_span_m3min: 30.0,
            concentration_mg_m3: 250.0,
            density_g_cm3: 0.815,
            displacement_a_cm3: 0.25,
            displacement_b_cm3: 0.25,
            tank_capacity_l: 200.0,
            max_spm: 45.0,
            sensor_fail_prob: 0.02,
            noise_pct: 0.03,
            flow_step_v: 0.06,
        }
    }
}

/// Fleet cadence and publishing knobs.
#[derive(Debug, Clone)]
pub struct RunCfg {
    /// Product code segment of the topic namespace.
    pub product_code: String,
    /// Topic namespace root.
    pub topic_root: String,
    /// Tick period, seconds.
    pub period_s: f64,
    /// Republish the status record after this many seconds without one.
    pub stat_refresh_s: u64,
    /// Ask the bus to retain status records for late subscribers.
    pub retain_stat: bool,
}

impl Default for RunCfg {
    fn default() -> Self {
        Self {
            product_code: "A1B2C3".to_string(),
            topic_root: "soia".to_string(),
            period_s: 30.0,
            stat_refresh_s: 300,
            retain_stat: true,
        }
    }
}
