//! One simulation time-step: the ordered per-device pipeline.

use crate::config::ProcessCfg;
use crate::dosing::{self, DosingOutcome};
use crate::rotation::{self, Pump, RotationEvent};
use crate::sensor::{self, SensorState};
use crate::signal;
use crate::state::DeviceState;
use crate::tank;
use rand::Rng;

/// Everything one tick produced for one device: the successor state plus
/// the observations the telemetry layer publishes.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub next: DeviceState,
    /// Engineering flow this tick, m3/min.
    pub flow_m3min: f64,
    pub dosing: DosingOutcome,
    pub sensor: SensorState,
    pub rotation: Option<RotationEvent>,
    /// Strokes attributed to each pump this tick (0 for the inactive one).
    pub pulses_period_a: u32,
    pub pulses_period_b: u32,
    /// Tank percent full after consumption.
    pub level_pct: f64,
}

/// Advance `state` by one tick.
///
/// The step order is a contract: rotation is resolved after the pulse count
/// and the sensor sample are known, and before pulse attribution and tank
/// consumption, so a failover tick charges its strokes and chemical volume
/// to the pump that ends the tick active.
pub fn step_device<R: Rng + ?Sized>(
    state: &DeviceState,
    process: &ProcessCfg,
    period_s: f64,
    rng: &mut R,
) -> TickReport {
    // 1-2) flow signal walk and engineering conversion
    let flow_signal_v = signal::advance_volts(rng, state.flow_signal_v, process.flow_step_v);
    let flow_m3min = signal::to_flow_m3min(flow_signal_v, process.q_span_m3min);

    // 3) dosing against the pump that was active when the tick began
    let dosing = dosing::compute(
        rng,
        flow_m3min,
        process.displacement_cm3(state.active_pump),
        period_s,
        process,
    );

    // 4-5) injection confirmation and the no-detection accumulator
    let sensor = sensor::sample(rng, process.sensor_fail_prob);
    let no_detect_count = sensor::update_no_detect(state.no_detect_count, sensor, dosing.pulses);

    // 6) failover policy; the flip and the counter reset apply together
    let rotation = rotation::evaluate(state.active_pump, no_detect_count);
    let (active_pump, no_detect_count) = match rotation {
        Some(ev) => (ev.to, 0),
        None => (state.active_pump, no_detect_count),
    };

    // 7) lifetime totals for the now-active pump
    let (pulses_period_a, pulses_period_b) = match active_pump {
        Pump::A => (dosing.pulses, 0),
        Pump::B => (0, dosing.pulses),
    };
    let pulses_total_a = state.pulses_total_a + u64::from(pulses_period_a);
    let pulses_total_b = state.pulses_total_b + u64::from(pulses_period_b);

    // 8-9) deplete with the now-active displacement, re-derive the level
    let tank_volume_l = tank::consume(
        state.tank_volume_l,
        dosing.pulses,
        process.displacement_cm3(active_pump),
    );
    let level_pct = tank::level_percent(tank_volume_l, process.tank_capacity_l);
    let level_signal_v = signal::level_volts(level_pct);

    let next = DeviceState {
        device_id: state.device_id.clone(),
        active_pump,
        no_detect_count,
        pulses_total_a,
        pulses_total_b,
        tank_volume_l,
        flow_signal_v,
        level_signal_v,
    };

    TickReport {
        next,
        flow_m3min,
        dosing,
        sensor,
        rotation,
        pulses_period_a,
        pulses_period_b,
        level_pct,
    }
}
