//! Decoder boundary
//!
//! The engine drives two kinds of media backends through [`MediaBackend`]:
//! an adaptive-stream decoder (HLS) attached to a media element, and the
//! media element's own native playback. Both are black boxes; the engine
//! only sees the commands below and the [`BackendEvent`]s they deliver.

use crate::utils::config::RetryPolicy;
use crate::utils::error::Result;
use std::fmt;

/// Identifies one live backend instance
///
/// A new id is allocated every time a backend is constructed (initial
/// load and every fallback), so events from a replaced instance can be
/// recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Handle for one event registration on a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Which decoding strategy a backend implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Manifest-driven adaptive-stream decoder
    Adaptive,
    /// Direct playback by the media element
    Native,
}

/// Event categories the engine registers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    Ready,
    Duration,
    Progress,
    Play,
    Pause,
    Ended,
    Error,
}

impl EventTopic {
    pub const ALL: [EventTopic; 7] = [
        EventTopic::Ready,
        EventTopic::Duration,
        EventTopic::Progress,
        EventTopic::Play,
        EventTopic::Pause,
        EventTopic::Ended,
        EventTopic::Error,
    ];
}

/// Error category reported by the adaptive decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Network,
    Media,
    Other,
}

/// Load stage a network error happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStage {
    Manifest,
    Level,
    Fragment,
}

/// Decoder error detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetails {
    ManifestLoad,
    LevelLoad,
    FragmentLoad,
    BufferStalled,
    Other(String),
}

impl ErrorDetails {
    /// Load stage for network-related details
    pub fn stage(&self) -> Option<LoadStage> {
        match self {
            ErrorDetails::ManifestLoad => Some(LoadStage::Manifest),
            ErrorDetails::LevelLoad => Some(LoadStage::Level),
            ErrorDetails::FragmentLoad => Some(LoadStage::Fragment),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetails::ManifestLoad => f.write_str("manifest load error"),
            ErrorDetails::LevelLoad => f.write_str("level load error"),
            ErrorDetails::FragmentLoad => f.write_str("fragment load error"),
            ErrorDetails::BufferStalled => f.write_str("buffer stalled"),
            ErrorDetails::Other(s) => f.write_str(s),
        }
    }
}

/// Error event as tagged by the adaptive decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderError {
    pub fatal: bool,
    pub kind: ErrorType,
    pub details: ErrorDetails,
}

impl DecoderError {
    pub fn fatal(kind: ErrorType, details: ErrorDetails) -> Self {
        Self {
            fatal: true,
            kind,
            details,
        }
    }

    pub fn transient(kind: ErrorType, details: ErrorDetails) -> Self {
        Self {
            fatal: false,
            kind,
            details,
        }
    }
}

/// Lifecycle events delivered by a backend
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// Manifest parsed (adaptive) or enough data to start (native)
    Ready,
    /// Media duration in seconds
    DurationChanged(f64),
    /// Current playback position in seconds
    TimeUpdate(f64),
    Playing,
    Paused,
    Ended,
    /// Adaptive decoder error
    Decoder(DecoderError),
    /// Native media element failure, e.g. unsupported codec
    NativeFailure(String),
}

/// One live decoding pipeline
pub trait MediaBackend {
    /// Strategy implemented by this backend
    fn kind(&self) -> BackendKind;

    /// Register for a category of events, tagged with `session`
    fn subscribe(&mut self, session: SessionId, topic: EventTopic) -> SubscriptionId;

    /// Release a registration made by [`MediaBackend::subscribe`]
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Bind the decoder to the media element
    fn attach_media(&mut self) -> Result<()>;

    /// Point the backend at a stream URL
    fn load_source(&mut self, url: &str) -> Result<()>;

    /// Restart loading of the current source after a network error
    fn start_load(&mut self) -> Result<()>;

    /// Attempt in-place recovery after a media error
    fn recover_media_error(&mut self) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn set_muted(&mut self, muted: bool);

    fn set_volume(&mut self, volume: f32);

    /// Tear down the pipeline; the instance is unusable afterwards
    fn destroy(&mut self);
}

/// Constructs backends for the engine
pub trait BackendFactory {
    /// Whether the adaptive decoder can run on this platform
    fn adaptive_supported(&self) -> bool;

    /// Whether the media element plays HLS manifests itself
    fn native_plays_hls(&self) -> bool {
        false
    }

    /// Build a fresh backend of the given kind
    ///
    /// # Arguments
    ///
    /// * `kind` - Decoding strategy
    /// * `retry` - Network retry budget for the adaptive decoder
    fn create(&mut self, kind: BackendKind, retry: &RetryPolicy) -> Result<Box<dyn MediaBackend>>;
}
