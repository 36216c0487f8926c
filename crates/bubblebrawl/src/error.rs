//! Unified error type for the Bubble Brawl server.

use bubblebrawl_protocol::ProtocolError;
use bubblebrawl_room::RoomError;
use bubblebrawl_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BubbleBrawlError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, invalid state).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`ServerConfig`].
    ///
    /// [`ServerConfig`]: crate::ServerConfig
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// An environment override could not be applied.
    #[error("invalid {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}
