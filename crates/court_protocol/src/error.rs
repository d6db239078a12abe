use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to decode server frame: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode client command: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error(transparent)]
    Codec(#[from] ProtocolError),
}

impl TransportError {
    #[must_use]
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::Handshake(message.into())
    }

    #[must_use]
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send(message.into())
    }
}
