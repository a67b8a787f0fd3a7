//! Realtime hub and connection configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::websocket::{ConnectionSettings, HubSettings, SlowConsumerPolicy};

use super::error::ValidationError;

/// Realtime configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound queue capacity
    #[serde(default = "default_send_buffer")]
    pub send_buffer: usize,

    /// Hub publish ingress capacity
    #[serde(default = "default_publish_buffer")]
    pub publish_buffer: usize,

    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,

    #[serde(default = "default_pong_timeout")]
    pub pong_timeout_secs: u64,

    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,

    /// Flush window after the peer disconnects
    #[serde(default = "default_drain_grace")]
    pub drain_grace_secs: u64,

    /// Largest inbound frame in bytes
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    #[serde(default)]
    pub slow_consumer_policy: SlowConsumerPolicy,
}

impl RealtimeConfig {
    pub fn hub_settings(&self) -> HubSettings {
        HubSettings {
            publish_buffer: self.publish_buffer,
            slow_consumer_policy: self.slow_consumer_policy,
        }
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            send_buffer: self.send_buffer,
            write_timeout: Duration::from_secs(self.write_timeout_secs),
            pong_timeout: Duration::from_secs(self.pong_timeout_secs),
            ping_interval: Duration::from_secs(self.ping_interval_secs),
            drain_grace: Duration::from_secs(self.drain_grace_secs),
        }
    }

    /// Validate realtime configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            ("realtime.send_buffer", self.send_buffer as u64),
            ("realtime.publish_buffer", self.publish_buffer as u64),
            ("realtime.write_timeout_secs", self.write_timeout_secs),
            ("realtime.pong_timeout_secs", self.pong_timeout_secs),
            ("realtime.ping_interval_secs", self.ping_interval_secs),
            ("realtime.max_message_size", self.max_message_size as u64),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ValidationError::MustBePositive(*name));
        }

        if self.ping_interval_secs >= self.pong_timeout_secs {
            return Err(ValidationError::PingIntervalTooLong);
        }

        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            send_buffer: default_send_buffer(),
            publish_buffer: default_publish_buffer(),
            write_timeout_secs: default_write_timeout(),
            pong_timeout_secs: default_pong_timeout(),
            ping_interval_secs: default_ping_interval(),
            drain_grace_secs: default_drain_grace(),
            max_message_size: default_max_message_size(),
            slow_consumer_policy: SlowConsumerPolicy::default(),
        }
    }
}

fn default_send_buffer() -> usize {
    256
}

fn default_publish_buffer() -> usize {
    1024
}

fn default_write_timeout() -> u64 {
    10
}

fn default_pong_timeout() -> u64 {
    60
}

// 9/10 of the pong timeout
fn default_ping_interval() -> u64 {
    54
}

fn default_drain_grace() -> u64 {
    5
}

fn default_max_message_size() -> usize {
    512
}
