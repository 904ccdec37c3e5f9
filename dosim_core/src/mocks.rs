//! Test and helper publishers for dosim_core

use dosim_traits::Publisher;

/// One captured publish call.
#[derive(Debug, Clone)]
pub struct PublishedRecord {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

/// Publisher that stores every record in memory; useful for asserting on
/// exactly what a tick put on the wire.
#[derive(Debug, Default)]
pub struct MemoryPublisher {
    pub records: Vec<PublishedRecord>,
}

impl MemoryPublisher {
    pub fn topics(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.topic.as_str()).collect()
    }
}

impl Publisher for MemoryPublisher {
    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        retain: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.records.push(PublishedRecord {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            retain,
        });
        Ok(())
    }
}

/// Publisher that always errors; the tick loop must log and keep going.
pub struct FailingPublisher;

impl Publisher for FailingPublisher {
    fn publish(
        &mut self,
        _topic: &str,
        _payload: &[u8],
        _retain: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("bus down")))
    }
}
