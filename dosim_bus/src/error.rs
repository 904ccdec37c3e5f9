use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("invalid qos {0} (expected 0, 1 or 2)")]
    InvalidQos(u8),
    #[error("mqtt publish: {0}")]
    Publish(String),
}
