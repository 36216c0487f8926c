//! Error types for the protocol layer.
//!
//! Each crate in Bubble Brawl defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the shape of a message, not in
//! networking or room management.

/// Errors that can occur while encoding, decoding, or validating messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `event` name, or a
    /// `playerAction` whose `type` isn't recognized.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A room id that doesn't follow the `room-<n>` format.
    #[error("invalid room id: {0:?}")]
    InvalidRoomId(String),

    /// The message decoded fine but violates protocol rules, e.g. a
    /// shot angle that isn't a finite number.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
