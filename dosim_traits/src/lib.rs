pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Outbound telemetry port. The simulation core publishes every record
/// through this trait and never sees the underlying bus client.
///
/// `retain` asks the bus to keep the message as the last known value for
/// late subscribers; implementations without retained delivery may ignore it.
pub trait Publisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
