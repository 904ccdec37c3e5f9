//! Per-device mutable simulation state.

use crate::config::ProcessCfg;
use crate::rotation::Pump;
use crate::signal;
use crate::tank;
use rand::Rng;

/// One simulated doser cabinet. Created at startup, advanced every tick by
/// `tick::step_device`, owned exclusively by the fleet runner.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub device_id: String,
    /// Which displacement pump is currently dosing.
    pub active_pump: Pump,
    /// Pulses issued without confirmed liquid detection.
    pub no_detect_count: u32,
    /// Lifetime pulse counters, monotonically non-decreasing.
    pub pulses_total_a: u64,
    pub pulses_total_b: u64,
    /// Remaining chemical volume, litres, in [0, tank_capacity_l].
    pub tank_volume_l: f64,
    /// Analog flow transducer reading, volts, in [1.0, 5.0].
    pub flow_signal_v: f64,
    /// Analog level transducer reading, volts, derived from the tank.
    pub level_signal_v: f64,
}

impl DeviceState {
    /// Fresh state: pump A selected, tank full, flow starting near
    /// mid-span (2.8 V +/- 0.2 V), counters at zero.
    pub fn new<R: Rng + ?Sized>(
        device_id: impl Into<String>,
        process: &ProcessCfg,
        rng: &mut R,
    ) -> Self {
        let flow_signal_v =
            (2.8_f64 + rng.gen_range(-0.2..=0.2)).clamp(signal::VOLTS_MIN, signal::VOLTS_MAX);
        let tank_volume_l = process.tank_capacity_l;
        let level_signal_v =
            signal::level_volts(tank::level_percent(tank_volume_l, process.tank_capacity_l));
        Self {
            device_id: device_id.into(),
            active_pump: Pump::A,
            no_detect_count: 0,
            pulses_total_a: 0,
            pulses_total_b: 0,
            tank_volume_l,
            flow_signal_v,
            level_signal_v,
        }
    }
}
