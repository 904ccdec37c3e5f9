//! `From` implementations bridging `dosim_config` types to `dosim_core`
//! types, so the CLI never maps fields by hand.

use crate::config::{ProcessCfg, RunCfg};

impl From<&dosim_config::ProcessCfg> for ProcessCfg {
    fn from(c: &dosim_config::ProcessCfg) -> Self {
        Self {
            q_span_m3min: c.q_span_m3min,
            concentration_mg_m3: c.concentration_mg_m3,
            density_g_cm3: c.density_g_cm3,
            displacement_a_cm3: c.displacement_a_cm3,
            displacement_b_cm3: c.displacement_b_cm3,
            tank_capacity_l: c.tank_capacity_l,
            max_spm: c.max_spm,
            sensor_fail_prob: c.sensor_fail_prob,
            noise_pct: c.noise_pct,
            flow_step_v: c.flow_step_v,
        }
    }
}

impl From<&dosim_config::Config> for RunCfg {
    fn from(c: &dosim_config::Config) -> Self {
        Self {
            product_code: c.sim.product_code.clone(),
            topic_root: c.sim.topic_root.clone(),
            period_s: c.sim.period_s,
            stat_refresh_s: c.sim.stat_refresh_s,
            retain_stat: c.mqtt.retain_stat,
        }
    }
}
