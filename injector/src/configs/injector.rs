use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable run configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjectorConfig {
    /// Path of the Unix stream socket the log agent listens on.
    pub socket_path: String,
    /// Message template, see [`crate::template::MessageTemplate`].
    pub message_format: String,
    /// Target rate in messages per second.
    pub target_rate: u32,
    /// Run duration in seconds. Zero ends the run right after connecting.
    pub duration: u64,
    /// Messages sent back to back before the scheduler waits.
    pub batch_size: u32,
    /// Report every failed send, not only the error counter.
    pub verbose: bool,
    /// Pause between dropping a failed connection and reconnecting.
    pub reconnect_interval_ms: u64,
    /// Connection attempts made after a failed send before giving up.
    pub reconnect_attempts: u32,
}

impl InjectorConfig {
    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.duration)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }
}
