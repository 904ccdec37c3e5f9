//! Fleet runner behavior: record fan-out, status refresh, cadence, shutdown.

use dosim_core::config::{ProcessCfg, RunCfg};
use dosim_core::mocks::{FailingPublisher, MemoryPublisher};
use dosim_core::runner::Simulation;
use dosim_traits::ManualClock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn quiet_process() -> ProcessCfg {
    ProcessCfg {
        noise_pct: 0.0,
        sensor_fail_prob: 0.0,
        ..ProcessCfg::default()
    }
}

fn run_cfg() -> RunCfg {
    RunCfg::default() // 30 s period, 300 s refresh, retained status
}

fn new_sim(
    devices: &[&str],
    process: ProcessCfg,
    run: RunCfg,
) -> (Simulation<MemoryPublisher>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let sim = Simulation::new(
        &ids(devices),
        process,
        run,
        MemoryPublisher::default(),
        clock.clone(),
        Some(42),
    )
    .expect("build simulation");
    (sim, clock)
}

#[test]
fn first_tick_emits_six_records_plus_status_per_device() {
    let (mut sim, _clock) = new_sim(&["dev-001", "dev-002"], quiet_process(), run_cfg());
    sim.tick_once();

    let topics = sim.publisher().topics();
    assert_eq!(topics.len(), 2 * 7);
    for dev in ["dev-001", "dev-002"] {
        for leaf in [
            "tele/ai/flow",
            "tele/di/inj_sensor",
            "tele/pulse/doser_a",
            "tele/pulse/doser_b",
            "tele/qa/dosing_check",
            "tele/ai/level",
            "stat/active_doser",
        ] {
            let full = format!("soia/A1B2C3/{dev}/{leaf}");
            assert!(topics.contains(&full.as_str()), "missing {full}");
        }
    }

    // Only the status record is retained.
    for rec in &sim.publisher().records {
        let is_stat = rec.topic.ends_with("stat/active_doser");
        assert_eq!(rec.retain, is_stat, "retain wrong for {}", rec.topic);
    }
}

#[test]
fn steady_state_ticks_skip_the_status_record() {
    let (mut sim, _clock) = new_sim(&["dev-001"], quiet_process(), run_cfg());
    let shutdown = AtomicBool::new(false);
    sim.run(&shutdown, Some(3)).expect("run");

    let statuses = sim
        .publisher()
        .records
        .iter()
        .filter(|r| r.topic.ends_with("stat/active_doser"))
        .count();
    // Initial publish only; no rotation, refresh window not yet elapsed.
    assert_eq!(statuses, 1);
    assert_eq!(sim.publisher().records.len(), 3 * 6 + 1);
}

#[test]
fn status_refreshes_once_the_window_elapses() {
    let (mut sim, _clock) = new_sim(&["dev-001"], quiet_process(), run_cfg());
    let shutdown = AtomicBool::new(false);
    // Ticks land at t = 0, 30, 60, ... 330 s. The refresh fires on the
    // first tick strictly past 300 s since the initial publish.
    sim.run(&shutdown, Some(12)).expect("run");

    let statuses: Vec<_> = sim
        .publisher()
        .records
        .iter()
        .filter(|r| r.topic.ends_with("stat/active_doser"))
        .collect();
    assert_eq!(statuses.len(), 2);
    let last = statuses.last().unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&last.payload).unwrap();
    assert_eq!(payload["active"], "A");
    assert!(payload["reason"].is_null());
}

#[test]
fn permanent_sensor_failure_rotates_and_publishes_reasons() {
    let process = ProcessCfg {
        sensor_fail_prob: 1.0,
        ..quiet_process()
    };
    let (mut sim, _clock) = new_sim(&["dev-001"], process, run_cfg());
    let shutdown = AtomicBool::new(false);
    // 9 unconfirmed strokes per tick cross the threshold every tick.
    sim.run(&shutdown, Some(3)).expect("run");

    let statuses: Vec<serde_json::Value> = sim
        .publisher()
        .records
        .iter()
        .filter(|r| r.topic.ends_with("stat/active_doser"))
        .map(|r| serde_json::from_slice(&r.payload).unwrap())
        .collect();
    assert_eq!(statuses.len(), 3);
    let actives: Vec<&str> = statuses.iter().map(|s| s["active"].as_str().unwrap()).collect();
    assert_eq!(actives, ["B", "A", "B"]);
    for s in &statuses {
        assert_eq!(s["reason"], "sensor_no_detection_after_5_pulses");
    }
}

#[test]
fn sleep_compensates_for_processing_time() {
    let (mut sim, clock) = new_sim(&["dev-001"], quiet_process(), run_cfg());
    let shutdown = AtomicBool::new(false);
    sim.run(&shutdown, Some(5)).expect("run");

    // Zero processing time on the manual clock: four full inter-tick
    // sleeps of exactly one period, none after the final tick.
    assert_eq!(clock.elapsed(), Duration::from_millis(4 * 30_000));
    assert_eq!(sim.ticks_done(), 5);
}

#[test]
fn shutdown_flag_stops_before_the_next_tick() {
    let (mut sim, _clock) = new_sim(&["dev-001"], quiet_process(), run_cfg());
    let shutdown = AtomicBool::new(false);
    shutdown.store(true, Ordering::Relaxed);
    sim.run(&shutdown, None).expect("run");
    assert_eq!(sim.ticks_done(), 0);
    assert!(sim.publisher().records.is_empty());
}

#[test]
fn publish_failures_never_abort_the_loop() {
    let clock = Arc::new(ManualClock::new());
    let mut sim = Simulation::new(
        &ids(&["dev-001"]),
        quiet_process(),
        run_cfg(),
        FailingPublisher,
        clock,
        Some(42),
    )
    .expect("build simulation");
    let shutdown = AtomicBool::new(false);
    sim.run(&shutdown, Some(2)).expect("run");
    assert_eq!(sim.ticks_done(), 2);
    // The simulation still advanced: the tank is below capacity.
    let st = sim.states().next().unwrap();
    assert!(st.tank_volume_l < ProcessCfg::default().tank_capacity_l);
}

#[test]
fn build_rejects_an_empty_fleet() {
    let clock = Arc::new(ManualClock::new());
    let err = Simulation::new(
        &[],
        quiet_process(),
        run_cfg(),
        MemoryPublisher::default(),
        clock,
        None,
    )
    .expect_err("empty fleet must not build");
    assert!(format!("{err}").contains("no devices"));
}

#[test]
fn build_rejects_a_degenerate_period() {
    let clock = Arc::new(ManualClock::new());
    let run = RunCfg {
        period_s: 0.0,
        ..run_cfg()
    };
    let err = Simulation::new(
        &ids(&["dev-001"]),
        quiet_process(),
        run,
        MemoryPublisher::default(),
        clock,
        None,
    )
    .expect_err("zero period must not build");
    assert!(format!("{err}").contains("period_s"));
}
