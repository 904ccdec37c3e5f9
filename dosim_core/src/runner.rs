//! Fleet loop: advances every device each tick, publishes its records, and
//! holds the cadence without accumulating drift.

use crate::config::{ProcessCfg, RunCfg};
use crate::error::{BuildError, Result};
use crate::rotation::Pump;
use crate::state::DeviceState;
use crate::telemetry::{
    ActiveDoserStatus, DosingCheck, FlowReading, InjectionSensorReading, LevelReading,
    PulseReading, Topics,
};
use crate::tick;
use crate::util;
use chrono::Utc;
use dosim_traits::{Clock, Publisher};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

struct DeviceSlot {
    state: DeviceState,
    topics: Topics,
    /// ms since the runner epoch at the last status publish; None before
    /// the first one, which forces an initial publish.
    stat_published_ms: Option<u64>,
}

/// The whole fleet plus its injected collaborators (publisher, clock, RNG).
///
/// Single-threaded by design: one logical clock drives all devices, devices
/// are stepped sequentially and share no mutable state.
pub struct Simulation<P: Publisher> {
    process: ProcessCfg,
    run: RunCfg,
    devices: Vec<DeviceSlot>,
    publisher: P,
    clock: Arc<dyn Clock + Send + Sync>,
    rng: StdRng,
    epoch: std::time::Instant,
    period_ms: u64,
    ticks_done: u64,
}

impl<P: Publisher> std::fmt::Debug for Simulation<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("process", &self.process)
            .field("run", &self.run)
            .field("devices", &self.devices.len())
            .field("period_ms", &self.period_ms)
            .field("ticks_done", &self.ticks_done)
            .finish_non_exhaustive()
    }
}

impl<P: Publisher> Simulation<P> {
    /// Validate preconditions and build the fleet. Device state is seeded
    /// here, so a fixed seed reproduces the entire run.
    pub fn new(
        device_ids: &[String],
        process: ProcessCfg,
        run: RunCfg,
        publisher: P,
        clock: Arc<dyn Clock + Send + Sync>,
        seed: Option<u64>,
    ) -> Result<Self> {
        if device_ids.is_empty() {
            return Err(eyre::Report::new(BuildError::NoDevices));
        }
        if !run.period_s.is_finite() || run.period_s <= 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "period_s must be > 0",
            )));
        }
        if run.stat_refresh_s == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "stat_refresh_s must be >= 1",
            )));
        }

        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let devices = device_ids
            .iter()
            .map(|id| DeviceSlot {
                state: DeviceState::new(id.clone(), &process, &mut rng),
                topics: Topics::new(&run.topic_root, &run.product_code, id),
                stat_published_ms: None,
            })
            .collect();
        let epoch = clock.now();
        let period_ms = util::period_ms(run.period_s);

        Ok(Self {
            process,
            run,
            devices,
            publisher,
            clock,
            rng,
            epoch,
            period_ms,
            ticks_done: 0,
        })
    }

    /// Read-only view of the device states (diagnostics and tests).
    pub fn states(&self) -> impl Iterator<Item = &DeviceState> {
        self.devices.iter().map(|slot| &slot.state)
    }

    /// The injected publisher (tests inspect captured records through this).
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Ticks completed so far.
    pub fn ticks_done(&self) -> u64 {
        self.ticks_done
    }

    /// Run until `shutdown` is set, or until `max_ticks` ticks when given.
    ///
    /// Sleeps `period - elapsed` between ticks so publish jitter does not
    /// accumulate drift. The shutdown flag is checked between ticks only;
    /// a tick never needs rollback.
    pub fn run(&mut self, shutdown: &AtomicBool, max_ticks: Option<u64>) -> Result<()> {
        tracing::info!(
            devices = self.devices.len(),
            period_s = self.run.period_s,
            "simulation started"
        );
        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            let t0 = self.clock.now();
            self.tick_once();
            self.ticks_done += 1;
            if let Some(limit) = max_ticks
                && self.ticks_done >= limit
            {
                break;
            }
            let elapsed_ms = self.clock.ms_since(t0);
            self.clock
                .sleep(Duration::from_millis(self.period_ms.saturating_sub(elapsed_ms)));
        }
        tracing::info!(ticks = self.ticks_done, "simulation stopped");
        Ok(())
    }

    /// Advance every device one tick and publish its telemetry.
    pub fn tick_once(&mut self) {
        let ts = Utc::now();
        let now_ms = self.clock.ms_since(self.epoch);
        let refresh_ms = self.run.stat_refresh_s.saturating_mul(util::MILLIS_PER_SEC);

        for slot in &mut self.devices {
            let report =
                tick::step_device(&slot.state, &self.process, self.run.period_s, &mut self.rng);

            if let Some(ev) = report.rotation {
                tracing::info!(
                    device = %slot.state.device_id,
                    from = ev.from.as_str(),
                    to = ev.to.as_str(),
                    reason = ev.reason,
                    "doser rotated"
                );
            }

            publish_json(
                &mut self.publisher,
                &slot.topics.flow(),
                &FlowReading::from_report(ts, &report),
                false,
            );
            publish_json(
                &mut self.publisher,
                &slot.topics.inj_sensor(),
                &InjectionSensorReading {
                    ts,
                    state: report.sensor,
                },
                false,
            );
            publish_json(
                &mut self.publisher,
                &slot.topics.pulse(Pump::A),
                &PulseReading::for_pump(ts, Pump::A, &report, &self.process),
                false,
            );
            publish_json(
                &mut self.publisher,
                &slot.topics.pulse(Pump::B),
                &PulseReading::for_pump(ts, Pump::B, &report, &self.process),
                false,
            );
            publish_json(
                &mut self.publisher,
                &slot.topics.dosing_check(),
                &DosingCheck::from_report(ts, &report),
                false,
            );
            publish_json(
                &mut self.publisher,
                &slot.topics.level(),
                &LevelReading::from_report(ts, &report),
                false,
            );

            // Status on every rotation, plus a refresh once the window has
            // fully elapsed since this device's last status publish.
            let stat_due = match slot.stat_published_ms {
                None => true,
                Some(last) => now_ms.saturating_sub(last) > refresh_ms,
            };
            if report.rotation.is_some() || stat_due {
                publish_json(
                    &mut self.publisher,
                    &slot.topics.active_doser(),
                    &ActiveDoserStatus::from_report(ts, &report),
                    self.run.retain_stat,
                );
                slot.stat_published_ms = Some(now_ms);
            }

            slot.state = report.next;
        }
    }
}

/// Serialize and publish one record. Telemetry is at-most-once: failures are
/// logged and never abort the tick loop.
fn publish_json<P: Publisher, T: Serialize>(
    publisher: &mut P,
    topic: &str,
    record: &T,
    retain: bool,
) {
    match serde_json::to_vec(record) {
        Ok(payload) => {
            if let Err(e) = publisher.publish(topic, &payload, retain) {
                tracing::warn!(topic, error = %e, "publish failed");
            }
        }
        Err(e) => tracing::warn!(topic, error = %e, "record encode failed"),
    }
}
