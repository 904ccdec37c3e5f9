use dosim_config::{Config, load_toml};

#[test]
fn defaults_validate_cleanly() {
    let cfg = Config::default();
    cfg.validate().expect("default config must be valid");
}

#[test]
fn parses_a_full_toml_document() {
    let toml = r#"
[mqtt]
host = "broker.example.net"
port = 8883
user = "telemetry"
pass = "secret"
tls = true
qos = 1
retain_stat = true

[sim]
product_code = "PROD123"
devices = ["dev-001", "dev-002"]
period_s = 12.0
stat_refresh_s = 120
topic_root = "soia"
seed = 42

[process]
q_span_m3min = 30.0
concentration_mg_m3 = 250.0
density_g_cm3 = 0.815
displacement_a_cm3 = 0.25
displacement_b_cm3 = 0.25
tank_capacity_l = 200.0
max_spm = 45.0
sensor_fail_prob = 0.02
noise_pct = 0.03
flow_step_v = 0.06

[logging]
file = "dosim.log"
level = "debug"
rotation = "daily"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("validate");
    assert_eq!(cfg.mqtt.host, "broker.example.net");
    assert_eq!(cfg.mqtt.qos, 1);
    assert_eq!(cfg.sim.devices, vec!["dev-001", "dev-002"]);
    assert_eq!(cfg.sim.seed, Some(42));
    assert_eq!(cfg.process.density_g_cm3, 0.815);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
}

#[test]
fn partial_toml_falls_back_to_defaults() {
    let cfg = load_toml("[sim]\nperiod_s = 5.0\n").expect("parse TOML");
    cfg.validate().expect("validate");
    assert_eq!(cfg.sim.period_s, 5.0);
    assert_eq!(cfg.sim.product_code, "A1B2C3");
    assert_eq!(cfg.mqtt.port, 8883);
    assert_eq!(cfg.process.max_spm, 45.0);
}

#[test]
fn rejects_qos_above_two() {
    let cfg = load_toml("[mqtt]\nqos = 3\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject qos=3");
    assert!(format!("{err}").contains("mqtt.qos"));
}

#[test]
fn rejects_an_empty_device_list() {
    let cfg = load_toml("[sim]\ndevices = []\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject empty devices");
    assert!(format!("{err}").contains("sim.devices"));
}

#[test]
fn rejects_a_zero_period() {
    let cfg = load_toml("[sim]\nperiod_s = 0.0\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject period_s=0");
    assert!(format!("{err}").contains("sim.period_s"));
}

#[test]
fn rejects_an_out_of_range_failure_probability() {
    let cfg = load_toml("[process]\nsensor_fail_prob = 1.5\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject prob > 1");
    assert!(format!("{err}").contains("sensor_fail_prob"));
}

#[test]
fn rejects_negative_process_constants() {
    let cfg = load_toml("[process]\ndisplacement_a_cm3 = -0.25\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject negative displacement");
    assert!(format!("{err}").contains("displacement_a_cm3"));
}

#[test]
fn degenerate_but_legal_zeros_pass_validation() {
    // Zero displacement and zero capacity are defined no-op setups for the
    // simulation, not config errors.
    let cfg = load_toml(
        "[process]\ndisplacement_a_cm3 = 0.0\ndisplacement_b_cm3 = 0.0\ntank_capacity_l = 0.0\n",
    )
    .expect("parse TOML");
    cfg.validate().expect("zeros must validate");
}

#[test]
fn rejects_an_unknown_rotation_policy() {
    let cfg = load_toml("[logging]\nrotation = \"weekly\"\n").expect("parse TOML");
    let err = cfg.validate().expect_err("should reject unknown rotation");
    assert!(format!("{err}").contains("logging.rotation"));
}
