#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the dosing fleet simulator.
//!
//! - `Config` and sub-structs deserialize from TOML and are validated.
//! - Environment variables override file values using the historical
//!   variable names (`MQTT_HOST`, `PERIOD_S`, `Q_SPAN_M3MIN`, ...), so the
//!   simulator can run file-less in a container.
//! - Degenerate but legal process parameters (zero displacement, zero tank
//!   capacity) pass validation; the core defines their arithmetic as zero.
use serde::Deserialize;

/// Message-bus connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttCfg {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub tls: bool,
    /// Delivery QoS for telemetry records (0, 1 or 2).
    pub qos: u8,
    /// Retain the active-doser status record so late subscribers see it.
    pub retain_stat: bool,
}

impl Default for MqttCfg {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8883,
            user: None,
            pass: None,
            tls: true,
            qos: 0,
            retain_stat: true,
        }
    }
}

/// Fleet and cadence settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimCfg {
    /// Product code used in the topic namespace.
    pub product_code: String,
    /// Device identifiers; one simulated doser cabinet per entry.
    pub devices: Vec<String>,
    /// Tick period in seconds.
    pub period_s: f64,
    /// Republish the status record when more than this many seconds have
    /// elapsed since the device's last status publish.
    pub stat_refresh_s: u64,
    /// Topic namespace root.
    pub topic_root: String,
    /// Optional RNG seed; a fixed seed reproduces an entire run.
    pub seed: Option<u64>,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            product_code: "A1B2C3".to_string(),
            devices: vec!["dev-001".to_string()],
            period_s: 30.0,
            stat_refresh_s: 300,
            topic_root: "soia".to_string(),
            seed: None,
        }
    }
}

/// Process and engineering constants shared by every device.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessCfg {
    /// Gas flow at 5 V, in m3/min (1-5 V maps to 0..span).
    pub q_span_m3min: f64,
    /// Chemical concentration target in the gas, mg/m3.
    pub concentration_mg_m3: f64,
    /// Chemical density, g/cm3.
    pub density_g_cm3: f64,
    /// Pump A displacement, cm3 per stroke.
    pub displacement_a_cm3: f64,
    /// Pump B displacement, cm3 per stroke.
    pub displacement_b_cm3: f64,
    /// Tank capacity, litres.
    pub tank_capacity_l: f64,
    /// Mechanical stroke-rate ceiling, strokes/min.
    pub max_spm: f64,
    /// Per-tick probability that the injection sensor reports FAIL.
    pub sensor_fail_prob: f64,
    /// Multiplicative dosing noise magnitude (0.03 = +/-3%).
    pub noise_pct: f64,
    /// Flow random-walk step bound per tick, volts.
    pub flow_step_v: f64,
}

impl Default for ProcessCfg {
    fn default() -> Self {
        Self {
            q_span_m3min: 30.0,
            concentration_mg_m3: 250.0,
            density_g_cm3: 0.815,
            displacement_a_cm3: 0.25,
            displacement_b_cm3: 0.25,
            tank_capacity_l: 200.0,
            max_spm: 45.0,
            sensor_fail_prob: 0.02,
            noise_pct: 0.03,
            flow_step_v: 0.06,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub mqtt: MqttCfg,
    pub sim: SimCfg,
    pub process: ProcessCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Overlay environment variables onto this config.
    pub fn apply_env(&mut self) -> eyre::Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables from an arbitrary lookup (unit-testable without
    /// touching process-global environment state).
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> eyre::Result<()> {
        if let Some(v) = lookup("MQTT_HOST") {
            self.mqtt.host = v;
        }
        if let Some(v) = lookup("MQTT_PORT") {
            self.mqtt.port = parse(&v, "MQTT_PORT")?;
        }
        if let Some(v) = lookup("MQTT_USER") {
            self.mqtt.user = Some(v);
        }
        if let Some(v) = lookup("MQTT_PASS") {
            self.mqtt.pass = Some(v);
        }
        if let Some(v) = lookup("MQTT_TLS") {
            self.mqtt.tls = parse_bool(&v, "MQTT_TLS")?;
        }
        if let Some(v) = lookup("MQTT_QOS") {
            self.mqtt.qos = parse(&v, "MQTT_QOS")?;
        }
        if let Some(v) = lookup("RETAIN_STAT") {
            self.mqtt.retain_stat = parse_bool(&v, "RETAIN_STAT")?;
        }
        if let Some(v) = lookup("PRODUCT_CODE") {
            self.sim.product_code = v;
        }
        if let Some(v) = lookup("DEVICES") {
            self.sim.devices = v
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup("PERIOD_S") {
            self.sim.period_s = parse(&v, "PERIOD_S")?;
        }
        if let Some(v) = lookup("STAT_REFRESH_S") {
            self.sim.stat_refresh_s = parse(&v, "STAT_REFRESH_S")?;
        }
        if let Some(v) = lookup("TOPIC_ROOT") {
            self.sim.topic_root = v;
        }
        if let Some(v) = lookup("SIM_SEED") {
            self.sim.seed = Some(parse(&v, "SIM_SEED")?);
        }
        if let Some(v) = lookup("Q_SPAN_M3MIN") {
            self.process.q_span_m3min = parse(&v, "Q_SPAN_M3MIN")?;
        }
        if let Some(v) = lookup("C_MGM3") {
            self.process.concentration_mg_m3 = parse(&v, "C_MGM3")?;
        }
        if let Some(v) = lookup("RHO_G_CM3") {
            self.process.density_g_cm3 = parse(&v, "RHO_G_CM3")?;
        }
        if let Some(v) = lookup("E_A_CM3") {
            self.process.displacement_a_cm3 = parse(&v, "E_A_CM3")?;
        }
        if let Some(v) = lookup("E_B_CM3") {
            self.process.displacement_b_cm3 = parse(&v, "E_B_CM3")?;
        }
        if let Some(v) = lookup("TANK_LITERS") {
            self.process.tank_capacity_l = parse(&v, "TANK_LITERS")?;
        }
        if let Some(v) = lookup("MAX_SPM") {
            self.process.max_spm = parse(&v, "MAX_SPM")?;
        }
        if let Some(v) = lookup("DI_FAIL_PROB") {
            self.process.sensor_fail_prob = parse(&v, "DI_FAIL_PROB")?;
        }
        if let Some(v) = lookup("MISMATCH_NOISE_PCT") {
            self.process.noise_pct = parse(&v, "MISMATCH_NOISE_PCT")?;
        }
        if let Some(v) = lookup("FLOW_STEP_V") {
            self.process.flow_step_v = parse(&v, "FLOW_STEP_V")?;
        }
        Ok(())
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // MQTT
        if self.mqtt.host.is_empty() {
            eyre::bail!("mqtt.host must not be empty");
        }
        if self.mqtt.port == 0 {
            eyre::bail!("mqtt.port must be > 0");
        }
        if self.mqtt.qos > 2 {
            eyre::bail!("mqtt.qos must be 0, 1 or 2");
        }

        // Sim
        if self.sim.devices.is_empty() {
            eyre::bail!("sim.devices must list at least one device id");
        }
        if self.sim.devices.iter().any(|d| d.is_empty()) {
            eyre::bail!("sim.devices must not contain empty ids");
        }
        if !(self.sim.period_s > 0.0) || !self.sim.period_s.is_finite() {
            eyre::bail!("sim.period_s must be > 0");
        }
        if self.sim.period_s > 3600.0 {
            eyre::bail!("sim.period_s is unreasonably large (>1h)");
        }
        if self.sim.stat_refresh_s == 0 {
            eyre::bail!("sim.stat_refresh_s must be >= 1");
        }
        if self.sim.product_code.is_empty() {
            eyre::bail!("sim.product_code must not be empty");
        }
        if self.sim.topic_root.is_empty() || self.sim.topic_root.contains('/') {
            eyre::bail!("sim.topic_root must be a single non-empty topic segment");
        }

        // Process. Zero displacement/capacity/span are legal degenerate
        // setups; only negatives and non-finite values are rejected.
        let nonneg = [
            (self.process.q_span_m3min, "process.q_span_m3min"),
            (self.process.concentration_mg_m3, "process.concentration_mg_m3"),
            (self.process.density_g_cm3, "process.density_g_cm3"),
            (self.process.displacement_a_cm3, "process.displacement_a_cm3"),
            (self.process.displacement_b_cm3, "process.displacement_b_cm3"),
            (self.process.tank_capacity_l, "process.tank_capacity_l"),
            (self.process.max_spm, "process.max_spm"),
            (self.process.flow_step_v, "process.flow_step_v"),
        ];
        for (value, name) in nonneg {
            if !value.is_finite() || value < 0.0 {
                eyre::bail!("{name} must be finite and >= 0");
            }
        }
        if !(0.0..=1.0).contains(&self.process.sensor_fail_prob) {
            eyre::bail!("process.sensor_fail_prob must be in [0.0, 1.0]");
        }
        if !(0.0..1.0).contains(&self.process.noise_pct) {
            eyre::bail!("process.noise_pct must be in [0.0, 1.0)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of: never, daily, hourly");
        }

        Ok(())
    }
}

fn parse<T: std::str::FromStr>(raw: &str, var: &str) -> eyre::Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| eyre::eyre!("invalid {var}={raw:?}: {e}"))
}

fn parse_bool(raw: &str, var: &str) -> eyre::Result<bool> {
    match raw.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => eyre::bail!("invalid {var}={other:?}: expected 0/1/true/false"),
    }
}
