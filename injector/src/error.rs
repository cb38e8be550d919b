use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InjectorError {
    #[error("Cannot establish connection to: {0}")]
    CannotEstablishConnection(String),
    #[error("Cannot send message: {0}")]
    CannotSendMessage(#[source] io::Error),
    #[error("Reconnection to: {0} failed after {1} attempt(s)")]
    ReconnectionExhausted(String, u32),
    #[error("Not connected")]
    NotConnected,
    #[error("Cannot load configuration: {0}")]
    CannotLoadConfiguration(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid message template: {0}")]
    InvalidTemplate(String),
    #[error("Invalid state transition from {0} to {1}")]
    InvalidStateTransition(String, String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl InjectorError {
    /// Whether the error ends the run, as opposed to being counted and recovered from.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, InjectorError::CannotSendMessage(_))
    }
}
