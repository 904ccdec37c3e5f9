#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions)]
//! Message-bus backends for the simulator.
//!
//! The core only sees `dosim_traits::Publisher`; this crate provides the
//! real MQTT client (`MqttPublisher`, backed by `rumqttc`) and a stdout
//! stand-in (`StdoutPublisher`) for broker-less dry runs.

pub mod error;

pub use error::BusError;

use dosim_traits::Publisher;
use rand::Rng;
use rumqttc::{Client, Event, MqttOptions, QoS, Transport};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Client id in the shape the fleet has always used: `sim-{unix}-{nonce}`.
pub fn default_client_id() -> String {
    let unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let nonce: u16 = rand::thread_rng().gen_range(1000..=9999);
    format!("sim-{unix}-{nonce}")
}

fn qos_from_u8(qos: u8) -> Result<QoS, BusError> {
    match qos {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(BusError::InvalidQos(other)),
    }
}

/// MQTT-backed publisher. The network event loop runs on one background
/// thread; `publish` only enqueues onto the client's request channel, so the
/// tick loop never blocks on the broker.
pub struct MqttPublisher {
    client: Client,
    qos: QoS,
}

impl MqttPublisher {
    /// Build the client from connection settings and start the event-loop
    /// thread. Connection and reconnection failures surface as warnings from
    /// that thread; telemetry delivery is at-most-once by design.
    pub fn connect(cfg: &dosim_config::MqttCfg, client_id: &str) -> Result<Self, BusError> {
        let qos = qos_from_u8(cfg.qos)?;

        let mut options = MqttOptions::new(client_id, &cfg.host, cfg.port);
        options.set_keep_alive(Duration::from_secs(60));
        options.set_clean_session(true);
        if let (Some(user), Some(pass)) = (&cfg.user, &cfg.pass) {
            options.set_credentials(user, pass);
        }
        if cfg.tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        let (client, mut connection) = Client::new(options, 64);
        let host = cfg.host.clone();
        // Detached on purpose: the event loop runs for the process lifetime.
        let _ = std::thread::Builder::new()
            .name("mqtt-eventloop".to_string())
            .spawn(move || {
                for event in connection.iter() {
                    match event {
                        Ok(Event::Incoming(rumqttc::Packet::ConnAck(_))) => {
                            tracing::info!(host = %host, "mqtt connected");
                        }
                        Ok(event) => {
                            tracing::trace!(?event, "mqtt event");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "mqtt connection error; retrying");
                            std::thread::sleep(Duration::from_secs(1));
                        }
                    }
                }
            })
            .map_err(|e| BusError::Publish(format!("spawn event loop: {e}")))?;

        Ok(Self { client, qos })
    }
}

impl Publisher for MqttPublisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.client
            .publish(topic, self.qos, retain, payload.to_vec())
            .map_err(|e| Box::new(BusError::Publish(e.to_string())) as _)
    }
}

/// Broker-less backend: prints one `topic payload` line per record. Lets the
/// whole pipeline run (and be integration-tested) without a broker.
#[derive(Debug, Default)]
pub struct StdoutPublisher;

impl Publisher for StdoutPublisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let retain_mark = if retain { " [retained]" } else { "" };
        println!("{topic}{retain_mark} {}", String::from_utf8_lossy(payload));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, QoS::AtMostOnce)]
    #[case(1, QoS::AtLeastOnce)]
    #[case(2, QoS::ExactlyOnce)]
    fn qos_levels_map_through(#[case] raw: u8, #[case] expected: QoS) {
        assert_eq!(qos_from_u8(raw).unwrap(), expected);
    }

    #[test]
    fn qos_out_of_range_is_rejected() {
        let err = qos_from_u8(3).unwrap_err();
        assert!(err.to_string().contains("invalid qos 3"));
    }

    #[test]
    fn client_ids_follow_the_fleet_shape() {
        let id = default_client_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts[0], "sim");
        assert_eq!(parts.len(), 3);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        let nonce: u16 = parts[2].parse().unwrap();
        assert!((1000..=9999).contains(&nonce));
    }
}
