mod unix;

#[cfg(test)]
pub(crate) mod memory;

pub use unix::UnixSocketConnector;

use crate::error::InjectorError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

pub const RECORD_DELIMITER: &[u8] = b"\n";

/// A single outward stream to the message sink.
#[async_trait]
pub trait ConnectionStream: Debug + Send {
    /// Writes one message followed by [`RECORD_DELIMITER`].
    async fn write_record(&mut self, message: &[u8]) -> io::Result<()>;
    async fn shutdown(&mut self) -> io::Result<()>;
}

/// Opens connections to one fixed target.
#[async_trait]
pub trait Connector: Debug + Send + Sync {
    fn target(&self) -> &str;
    async fn connect(&self) -> io::Result<Box<dyn ConnectionStream>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectionConfig {
    /// Pause before each reconnection attempt.
    pub interval: Duration,
    /// Attempts made before the transport gives up.
    pub attempts: u32,
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            attempts: 1,
        }
    }
}

/// Owns the connection exclusively; it is replaced on failure, never shared.
#[derive(Debug)]
pub struct TransportClient {
    connector: Arc<dyn Connector>,
    stream: Option<Box<dyn ConnectionStream>>,
    reconnection: ReconnectionConfig,
}

impl TransportClient {
    pub fn new(connector: Arc<dyn Connector>, reconnection: ReconnectionConfig) -> Self {
        Self {
            connector,
            stream: None,
            reconnection,
        }
    }

    pub fn target(&self) -> &str {
        self.connector.target()
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Single connection attempt, no retries.
    pub async fn connect(&mut self) -> Result<(), InjectorError> {
        match self.connector.connect().await {
            Ok(stream) => {
                info!("Connected to: {}", self.target());
                self.stream = Some(stream);
                Ok(())
            }
            Err(error) => {
                error!("Failed to connect to: '{}': {error}", self.target());
                Err(InjectorError::CannotEstablishConnection(format!(
                    "{}: {error}",
                    self.target()
                )))
            }
        }
    }

    /// Sends one message and returns the number of bytes written, delimiter included.
    pub async fn send(&mut self, message: &[u8]) -> Result<usize, InjectorError> {
        let stream = self.stream.as_mut().ok_or(InjectorError::NotConnected)?;
        stream
            .write_record(message)
            .await
            .map_err(InjectorError::CannotSendMessage)?;
        Ok(message.len() + RECORD_DELIMITER.len())
    }

    /// Drops the current connection, pauses and connects again.
    ///
    /// Returns `Ok` without a connection when `shutdown` is cancelled while
    /// pausing or connecting.
    pub async fn reconnect(&mut self, shutdown: &CancellationToken) -> Result<(), InjectorError> {
        self.stream = None;
        let attempts = self.reconnection.attempts.max(1);
        for attempt in 1..=attempts {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Reconnection to: {} cancelled.", self.target());
                    return Ok(());
                }
                _ = sleep(self.reconnection.interval) => {}
            }
            info!(
                "Reconnecting to: {} ({attempt}/{attempts})...",
                self.target()
            );
            let result = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Reconnection to: {} cancelled.", self.target());
                    return Ok(());
                }
                result = self.connector.connect() => result,
            };
            match result {
                Ok(stream) => {
                    info!("Reconnected to: {}", self.target());
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(error) => {
                    warn!("Reconnection to: {} failed: {error}", self.target());
                }
            }
        }

        error!("Failed to reconnect to: {}", self.target());
        Err(InjectorError::ReconnectionExhausted(
            self.target().to_string(),
            attempts,
        ))
    }

    pub async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(error) = stream.shutdown().await {
                warn!("Failed to close connection to: {}: {error}", self.target());
            }
            info!("Disconnected from: {}", self.target());
        }
    }
}
