//! Shared error type across maimai crates.

use thiserror::Error;

/// Stable error codes (log fields, test vectors).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Envelope is not valid JSON or lacks a type tag.
    Decode,
    /// Type tag outside the known set.
    UnknownType,
    /// Payload bytes do not match the shape selected by the tag.
    MalformedPayload,
    /// Payload decoded to a different variant than the caller asked for.
    PayloadMismatch,
    /// Outgoing payload could not be serialized.
    Serialization,
    /// Seen/log store failure.
    Storage,
    /// Connection or fetch failure.
    Transport,
    /// Invalid configuration.
    Config,
    /// Unsupported config version.
    UnsupportedVersion,
}

impl ErrorCode {
    /// String representation used in logs and vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Decode => "DECODE",
            ErrorCode::UnknownType => "UNKNOWN_TYPE",
            ErrorCode::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorCode::PayloadMismatch => "PAYLOAD_MISMATCH",
            ErrorCode::Serialization => "SERIALIZATION",
            ErrorCode::Storage => "STORAGE",
            ErrorCode::Transport => "TRANSPORT",
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MaimaiError>;

/// Unified error type used by core and bot.
#[derive(Debug, Error)]
pub enum MaimaiError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("unknown packet type: {0}")]
    UnknownType(String),
    #[error("malformed {packet_type} payload: {reason}")]
    MalformedPayload {
        packet_type: &'static str,
        reason: String,
    },
    #[error("payload mismatch: expected {expected}, got {actual}")]
    PayloadMismatch {
        expected: &'static str,
        actual: &'static str,
    },
    #[error("serialization failed: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
}

impl MaimaiError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MaimaiError::Decode(_) => ErrorCode::Decode,
            MaimaiError::UnknownType(_) => ErrorCode::UnknownType,
            MaimaiError::MalformedPayload { .. } => ErrorCode::MalformedPayload,
            MaimaiError::PayloadMismatch { .. } => ErrorCode::PayloadMismatch,
            MaimaiError::Serialization(_) => ErrorCode::Serialization,
            MaimaiError::Storage(_) => ErrorCode::Storage,
            MaimaiError::Transport(_) => ErrorCode::Transport,
            MaimaiError::Config(_) => ErrorCode::Config,
            MaimaiError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
        }
    }

    /// Whether a handler hitting this error must escalate and stop.
    ///
    /// Protocol violations on a packet the handler asked for, and storage
    /// failures, leave the handler in an unknown state. Unknown tags and
    /// transport hiccups are handler-local and only logged.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MaimaiError::MalformedPayload { .. }
                | MaimaiError::PayloadMismatch { .. }
                | MaimaiError::Serialization(_)
                | MaimaiError::Storage(_)
        )
    }
}
