//! Playback failure taxonomy
//!
//! Network and media errors are handled inside the engine. Format errors
//! trigger a format fallback. Only terminal failures reach the consumer,
//! as the `Display` text of the variant.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    /// Load failure, retried in place within the decoder's budget
    #[error("network error: {0}")]
    Network(String),

    /// Decode failure, recovered in place once
    #[error("media error: {0}")]
    Media(String),

    /// Stream cannot be played in its current format
    #[error("format unsupported")]
    Format(String),

    /// Nothing left to try
    #[error("unrecoverable stream error")]
    Unrecoverable(String),
}

impl PlaybackError {
    /// Underlying detail, for logs
    pub fn details(&self) -> &str {
        match self {
            PlaybackError::Network(d)
            | PlaybackError::Media(d)
            | PlaybackError::Format(d)
            | PlaybackError::Unrecoverable(d) => d,
        }
    }

    /// Whether this failure ends the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackError::Format(_) | PlaybackError::Unrecoverable(_))
    }
}
