use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("no devices configured")]
    NoDevices,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
