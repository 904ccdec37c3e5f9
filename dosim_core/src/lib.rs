#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core fleet simulation (bus-agnostic).
//!
//! This crate holds the per-device physical-process model and the doser
//! state machine. All outbound I/O goes through `dosim_traits::Publisher`
//! and all pacing through `dosim_traits::Clock`, so the whole simulation
//! runs deterministically under a seeded RNG and a manual clock.
//!
//! ## Architecture
//!
//! - **Signals**: bounded random-walk analog readings and the 1-5 V
//!   engineering mappings (`signal` module)
//! - **Dosing**: required vs. achieved stroke rate, noise, mechanical
//!   ceiling, per-tick pulse count (`dosing` module)
//! - **Sensor**: injection-confirmation Bernoulli trial and the
//!   no-detection accumulator (`sensor` module)
//! - **Rotation**: A/B failover state machine (`rotation` module)
//! - **Tank**: depletion and level derivation (`tank` module)
//! - **Tick**: the ordered per-device pipeline (`tick` module)
//! - **Runner**: fleet loop, cadence, publishing (`runner` module)
//!
//! Tick ordering is the one non-obvious contract: rotation resolves after
//! the sensor sample and before pulse attribution and tank consumption, so
//! a failover tick is charged to the pump that ends the tick active.

pub mod config;
pub mod conversions;
pub mod dosing;
pub mod error;
pub mod mocks;
pub mod rotation;
pub mod runner;
pub mod sensor;
pub mod signal;
pub mod state;
pub mod tank;
pub mod telemetry;
pub mod tick;
pub mod util;

pub use config::{ProcessCfg, RunCfg};
pub use dosing::DosingOutcome;
pub use rotation::{Pump, RotationEvent};
pub use runner::Simulation;
pub use sensor::SensorState;
pub use state::DeviceState;
pub use tick::TickReport;
