//! Simulation assembly and execution: config mapping, publisher selection,
//! shutdown wiring.

use dosim_bus::{MqttPublisher, StdoutPublisher};
use dosim_core::config::{ProcessCfg, RunCfg};
use dosim_core::runner::Simulation;
use dosim_traits::{Clock, MonotonicClock, Publisher};
use eyre::Result;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct RunOpts {
    pub seed: Option<u64>,
    pub period_s: Option<f64>,
    pub ticks: Option<u64>,
    pub dry_run: bool,
}

pub fn run_simulation(cfg: &dosim_config::Config, opts: &RunOpts) -> Result<()> {
    let process: ProcessCfg = (&cfg.process).into();
    let mut run: RunCfg = cfg.into();
    if let Some(period_s) = opts.period_s {
        run.period_s = period_s;
    }
    let seed = opts.seed.or(cfg.sim.seed);

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        tracing::info!("shutdown requested");
        flag.store(true, Ordering::Relaxed);
    })?;

    if opts.dry_run {
        tracing::info!(devices = cfg.sim.devices.len(), "dry run: records go to stdout");
        drive(cfg, process, run, StdoutPublisher, seed, &shutdown, opts.ticks)
    } else {
        let client_id = dosim_bus::default_client_id();
        tracing::info!(
            host = %cfg.mqtt.host,
            port = cfg.mqtt.port,
            tls = cfg.mqtt.tls,
            qos = cfg.mqtt.qos,
            client_id = %client_id,
            devices = cfg.sim.devices.len(),
            "connecting to broker"
        );
        let publisher = MqttPublisher::connect(&cfg.mqtt, &client_id)?;
        drive(cfg, process, run, publisher, seed, &shutdown, opts.ticks)
    }
}

fn drive<P: Publisher>(
    cfg: &dosim_config::Config,
    process: ProcessCfg,
    run: RunCfg,
    publisher: P,
    seed: Option<u64>,
    shutdown: &AtomicBool,
    max_ticks: Option<u64>,
) -> Result<()> {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
    let mut sim = Simulation::new(&cfg.sim.devices, process, run, publisher, clock, seed)?;
    sim.run(shutdown, max_ticks)
}
