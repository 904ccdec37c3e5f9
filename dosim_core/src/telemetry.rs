//! Wire records and topic layout for the telemetry namespace.
//!
//! Each record is a flat JSON object with an RFC 3339 UTC timestamp,
//! published under `{root}/{product}/{device}`. Numeric fields are rounded
//! to presentation precision here; internal state is never rounded.

use crate::config::ProcessCfg;
use crate::rotation::Pump;
use crate::sensor::SensorState;
use crate::tick::TickReport;
use crate::util::round_dp;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Per-device topic set.
#[derive(Debug, Clone)]
pub struct Topics {
    base: String,
}

impl Topics {
    pub fn new(root: &str, product_code: &str, device_id: &str) -> Self {
        Self {
            base: format!("{root}/{product_code}/{device_id}"),
        }
    }

    pub fn flow(&self) -> String {
        format!("{}/tele/ai/flow", self.base)
    }
    pub fn inj_sensor(&self) -> String {
        format!("{}/tele/di/inj_sensor", self.base)
    }
    pub fn pulse(&self, pump: Pump) -> String {
        match pump {
            Pump::A => format!("{}/tele/pulse/doser_a", self.base),
            Pump::B => format!("{}/tele/pulse/doser_b", self.base),
        }
    }
    pub fn dosing_check(&self) -> String {
        format!("{}/tele/qa/dosing_check", self.base)
    }
    pub fn level(&self) -> String {
        format!("{}/tele/ai/level", self.base)
    }
    pub fn active_doser(&self) -> String {
        format!("{}/stat/active_doser", self.base)
    }
}

/// Analog flow reading in volts plus engineering units.
#[derive(Debug, Clone, Serialize)]
pub struct FlowReading {
    pub ts: DateTime<Utc>,
    pub volts: f64,
    pub q_m3min: f64,
    pub q_m3h: f64,
}

impl FlowReading {
    pub fn from_report(ts: DateTime<Utc>, report: &TickReport) -> Self {
        Self {
            ts,
            volts: round_dp(report.next.flow_signal_v, 3),
            q_m3min: round_dp(report.flow_m3min, 3),
            q_m3h: round_dp(report.flow_m3min * 60.0, 1),
        }
    }
}

/// Injection sensor digital input: `open` = OK, `closed` = FAIL.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionSensorReading {
    pub ts: DateTime<Utc>,
    pub state: SensorState,
}

/// Pulse counters for one pump; emitted for A and B every tick so the
/// backend can chart both.
#[derive(Debug, Clone, Serialize)]
pub struct PulseReading {
    pub ts: DateTime<Utc>,
    pub pulses_total: u64,
    pub pulses_period: u32,
    pub rate_per_min: f64,
    pub displacement_cm3: f64,
}

impl PulseReading {
    pub fn for_pump(
        ts: DateTime<Utc>,
        pump: Pump,
        report: &TickReport,
        process: &ProcessCfg,
    ) -> Self {
        let active = report.next.active_pump == pump;
        let (pulses_total, pulses_period) = match pump {
            Pump::A => (report.next.pulses_total_a, report.pulses_period_a),
            Pump::B => (report.next.pulses_total_b, report.pulses_period_b),
        };
        Self {
            ts,
            pulses_total,
            pulses_period,
            rate_per_min: if active {
                round_dp(report.dosing.spm_actual, 3)
            } else {
                0.0
            },
            displacement_cm3: process.displacement_cm3(pump),
        }
    }
}

/// QA coherence record between intended and achieved dosing.
#[derive(Debug, Clone, Serialize)]
pub struct DosingCheck {
    pub ts: DateTime<Utc>,
    pub spm_theoretical: f64,
    pub spm_actual: f64,
    pub mismatch_pct: f64,
    pub under_dosing_due_to_limit: bool,
}

impl DosingCheck {
    pub fn from_report(ts: DateTime<Utc>, report: &TickReport) -> Self {
        Self {
            ts,
            spm_theoretical: round_dp(report.dosing.spm_theoretical, 3),
            spm_actual: round_dp(report.dosing.spm_actual, 3),
            mismatch_pct: report.dosing.mismatch_pct,
            under_dosing_due_to_limit: report.dosing.under_limit,
        }
    }
}

/// Tank level estimated from consumption.
#[derive(Debug, Clone, Serialize)]
pub struct LevelReading {
    pub ts: DateTime<Utc>,
    pub volts: f64,
    pub percent: f64,
    pub tank_l: f64,
}

impl LevelReading {
    pub fn from_report(ts: DateTime<Utc>, report: &TickReport) -> Self {
        Self {
            ts,
            volts: round_dp(report.next.level_signal_v, 3),
            percent: round_dp(report.level_pct, 2),
            tank_l: round_dp(report.next.tank_volume_l, 3),
        }
    }
}

/// Active-pump status; `reason` is set only on the rotation tick.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveDoserStatus {
    pub ts: DateTime<Utc>,
    pub active: Pump,
    pub reason: Option<&'static str>,
}

impl ActiveDoserStatus {
    pub fn from_report(ts: DateTime<Utc>, report: &TickReport) -> Self {
        Self {
            ts,
            active: report.next.active_pump,
            reason: report.rotation.map(|ev| ev.reason),
        }
    }
}
