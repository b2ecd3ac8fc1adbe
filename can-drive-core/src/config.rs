//! Session configuration types
//!
//! This module defines the runtime settings of a control session. Every field
//! has a default so a partial (or missing) configuration file still yields a
//! usable session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Interface used when no configuration provides one
pub const DEFAULT_INTERFACE: &str = "can0";

/// Configuration for a control session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Transport channel name (e.g., "can0", "vcan0")
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Inbound poll interval in milliseconds (default: 50ms)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum frames drained per poll tick (default: 100)
    #[serde(default = "default_max_frames_per_poll")]
    pub max_frames_per_poll: usize,

    /// Drive command heartbeat interval in milliseconds (default: 500ms)
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_ms: u64,

    /// Delay between consecutive frames of one frame set (default: 10ms)
    #[serde(default = "default_inter_frame_delay")]
    pub inter_frame_delay_ms: u64,
}

fn default_interface() -> String {
    DEFAULT_INTERFACE.to_string()
}

fn default_poll_interval() -> u64 {
    50
}

fn default_max_frames_per_poll() -> usize {
    100
}

fn default_heartbeat_interval() -> u64 {
    500
}

fn default_inter_frame_delay() -> u64 {
    10
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            poll_interval_ms: default_poll_interval(),
            max_frames_per_poll: default_max_frames_per_poll(),
            heartbeat_interval_ms: default_heartbeat_interval(),
            inter_frame_delay_ms: default_inter_frame_delay(),
        }
    }
}

impl ControlConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the transport channel
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interface = interface.into();
        self
    }

    /// Builder method: set the inbound poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Builder method: set the per-tick drain bound
    pub fn with_max_frames_per_poll(mut self, max_frames: usize) -> Self {
        self.max_frames_per_poll = max_frames;
        self
    }

    /// Builder method: set the heartbeat interval
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Builder method: set the inter-frame delay
    pub fn with_inter_frame_delay(mut self, delay: Duration) -> Self {
        self.inter_frame_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn inter_frame_delay(&self) -> Duration {
        Duration::from_millis(self.inter_frame_delay_ms)
    }
}
