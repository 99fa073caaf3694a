//! Playback module for the IPTV player core
//!
//! This module drives stream playback for the active item: it picks the
//! decoding strategy for a URL, tracks the session state machine, and
//! recovers from decoder failures by retrying or switching stream format.

mod backend;
mod engine;
mod error;
mod state;

pub use backend::{
    BackendEvent, BackendFactory, BackendKind, DecoderError, ErrorDetails, ErrorType, EventTopic,
    LoadStage, MediaBackend, SessionId, SubscriptionId,
};
pub use engine::PlaybackEngine;
pub use error::PlaybackError;
pub use state::PlaybackSession;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No item loaded
    Idle,

    /// Stream is being opened
    Loading,

    /// Stream opened, not yet started
    Ready,

    /// Currently playing
    Playing,

    /// Playback paused
    Paused,

    /// End of media reached
    Ended,

    /// Terminal failure for the current item
    Error,
}

impl PlaybackState {
    /// States in which play/pause/mute/volume commands take effect
    pub fn is_playable(self) -> bool {
        matches!(
            self,
            PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Paused | PlaybackState::Ended
        )
    }
}

/// Observable outputs of the engine
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Stream is ready to play
    Ready,

    /// Media duration became known
    Duration { seconds: f64 },

    /// Playback position advanced
    Progress { played_seconds: f64 },

    /// End of media reached
    Ended,

    /// Terminal error, message is user-facing
    Error { message: String },

    /// Playback started
    Play,

    /// Playback paused
    Pause,
}

/// Player event handler trait
pub trait PlayerEventHandler {
    /// Handle player event
    fn handle_event(&mut self, event: &PlayerEvent);
}

impl<F> PlayerEventHandler for F
where
    F: FnMut(&PlayerEvent),
{
    fn handle_event(&mut self, event: &PlayerEvent) {
        self(event)
    }
}
