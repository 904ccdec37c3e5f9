//! Active-pump selection and the failover policy.

use serde::Serialize;

/// Displacement pump selector; exactly one pump is dosing at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pump {
    A,
    B,
}

impl Pump {
    /// The twin pump.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Pump::A => Pump::B,
            Pump::B => Pump::A,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Pump::A => "A",
            Pump::B => "B",
        }
    }
}

/// Unconfirmed pulses tolerated before failing over to the twin pump.
pub const NO_DETECT_ROTATION_THRESHOLD: u32 = 5;

/// Reason tag carried by the rotation event and the status record.
pub const ROTATION_REASON_NO_DETECTION: &str = "sensor_no_detection_after_5_pulses";

/// A resolved failover for one device on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationEvent {
    pub from: Pump,
    pub to: Pump,
    pub reason: &'static str,
}

/// Evaluate the failover policy once per tick.
///
/// Fires iff the accumulated unconfirmed-pulse count has reached the
/// threshold; otherwise the machine is a fixed point. The caller applies the
/// pump flip and the counter reset together so no tick ever observes a
/// half-rotation.
pub fn evaluate(active: Pump, no_detect_count: u32) -> Option<RotationEvent> {
    if no_detect_count >= NO_DETECT_ROTATION_THRESHOLD {
        Some(RotationEvent {
            from: active,
            to: active.other(),
            reason: ROTATION_REASON_NO_DETECTION,
        })
    } else {
        None
    }
}
