//! Playback engine
//!
//! The engine owns at most one live backend at a time and the
//! [`PlaybackSession`] for the active item. It turns backend events into
//! [`PlayerEvent`]s for the consumer and applies the recovery policy:
//!
//! - network errors restart loading, bounded per load stage
//! - media errors get a bounded number of in-place recoveries
//! - anything else fatal tears the backend down and tries the alternate
//!   stream format, at most `max_fallbacks_per_load` times
//! - a burst of transient errors above `max_error_count` also triggers a
//!   fallback attempt
//!
//! Every exit path (new load, fallback, terminal error, dispose, drop)
//! releases the backend's event registrations before destroying it.

use crate::media::PlayableItem;
use crate::player::backend::{
    BackendEvent, BackendFactory, BackendKind, DecoderError, ErrorType, EventTopic, MediaBackend,
    SessionId, SubscriptionId,
};
use crate::player::error::PlaybackError;
use crate::player::state::PlaybackSession;
use crate::player::{PlaybackState, PlayerEvent, PlayerEventHandler};
use crate::stream::{StreamFormat, StreamFormatResolver};
use crate::utils::config::PlayerConfig;
use crate::internal_error;
use crate::utils::error::{IptvError, Result};
use log::{debug, error, info, warn};

/// Backend plus the registrations the engine holds on it
struct LiveBackend {
    backend: Box<dyn MediaBackend>,
    subscriptions: Vec<SubscriptionId>,
}

impl LiveBackend {
    fn release(mut self) {
        for id in self.subscriptions.drain(..) {
            self.backend.unsubscribe(id);
        }
        self.backend.destroy();
    }
}

/// Playback state machine over a swappable backend
pub struct PlaybackEngine {
    factory: Box<dyn BackendFactory>,
    resolver: StreamFormatResolver,
    config: PlayerConfig,
    state: PlaybackState,
    session: Option<PlaybackSession>,
    live: Option<LiveBackend>,
    next_session: u64,
    handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl PlaybackEngine {
    pub fn new(factory: Box<dyn BackendFactory>, config: PlayerConfig) -> Self {
        Self {
            factory,
            resolver: StreamFormatResolver::new(),
            config,
            state: PlaybackState::Idle,
            session: None,
            live: None,
            next_session: 0,
            handlers: Vec::new(),
        }
    }

    /// Add event handler
    pub fn add_event_handler(&mut self, handler: Box<dyn PlayerEventHandler>) {
        self.handlers.push(handler);
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Whether a backend instance is currently alive
    pub fn has_live_backend(&self) -> bool {
        self.live.is_some()
    }

    /// Load an item, replacing whatever was playing
    ///
    /// The previous backend is fully released before the new one is built.
    /// Returns the id events from the new backend will carry.
    pub fn load(&mut self, item: &PlayableItem) -> Result<SessionId> {
        if item.url().trim().is_empty() {
            return Err(IptvError::invalid_input(format!(
                "item '{}' has no stream URL",
                item.id()
            )));
        }

        self.dispose();

        let url = self.resolver.resolve(item.url());
        info!("Loading {} '{}' from {}", item.kind(), item.name(), url);

        let kind = self.select_backend(&url);
        let id = self.allocate_session();
        self.session = Some(PlaybackSession::new(id, item.id(), &url, kind, &self.config));
        self.state = PlaybackState::Loading;

        if let Err(e) = self.start_backend(id, kind, &url) {
            self.fail(PlaybackError::Unrecoverable(e.to_string()));
            return Err(e);
        }

        Ok(id)
    }

    /// Start or resume playback; no-op unless ready, paused, playing or ended
    pub fn play(&mut self) -> Result<()> {
        if !self.state.is_playable() || self.state == PlaybackState::Playing {
            return Ok(());
        }

        if let Some(live) = self.live.as_mut() {
            live.backend.play()?;
        }
        self.enter_playing();
        Ok(())
    }

    /// Pause playback; no-op unless playing
    pub fn pause(&mut self) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }

        if let Some(live) = self.live.as_mut() {
            live.backend.pause()?;
        }
        self.enter_paused();
        Ok(())
    }

    pub fn toggle_play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => self.pause(),
            _ => self.play(),
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        if !self.state.is_playable() {
            return;
        }
        let (Some(session), Some(live)) = (self.session.as_mut(), self.live.as_mut()) else {
            return;
        };
        if session.is_muted != muted {
            session.is_muted = muted;
            live.backend.set_muted(muted);
            debug!("Muted: {}", muted);
        }
    }

    /// Set volume (clamped to 0.0..=1.0)
    pub fn set_volume(&mut self, volume: f32) {
        if !self.state.is_playable() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        let (Some(session), Some(live)) = (self.session.as_mut(), self.live.as_mut()) else {
            return;
        };
        if session.volume != volume {
            session.volume = volume;
            live.backend.set_volume(volume);
            debug!("Volume set to: {:.2}", volume);
        }
    }

    /// Tear down the backend and forget the session
    pub fn dispose(&mut self) {
        self.release_backend();
        if self.session.take().is_some() {
            debug!("Playback session disposed");
        }
        self.state = PlaybackState::Idle;
    }

    /// Feed an event delivered by the backend registered under `session`
    pub fn handle_event(&mut self, session: SessionId, event: BackendEvent) {
        let current = self.session.as_ref().map(|s| s.id);
        if current != Some(session) || self.live.is_none() {
            debug!("Dropping stale event from {}: {:?}", session, event);
            return;
        }

        match event {
            BackendEvent::Ready => self.on_ready(),
            BackendEvent::DurationChanged(seconds) => {
                self.emit(PlayerEvent::Duration { seconds });
            }
            BackendEvent::TimeUpdate(played_seconds) => {
                self.emit(PlayerEvent::Progress { played_seconds });
            }
            BackendEvent::Playing => {
                if self.state != PlaybackState::Playing {
                    self.mark_loaded();
                    self.enter_playing();
                }
            }
            BackendEvent::Paused => {
                if self.state == PlaybackState::Playing {
                    self.enter_paused();
                }
            }
            BackendEvent::Ended => {
                if let Some(s) = self.session.as_mut() {
                    s.is_playing = false;
                }
                self.state = PlaybackState::Ended;
                info!("Playback ended");
                self.emit(PlayerEvent::Ended);
            }
            BackendEvent::Decoder(err) => self.on_decoder_error(err),
            BackendEvent::NativeFailure(reason) => self.on_native_failure(reason),
        }
    }

    fn on_ready(&mut self) {
        if self.state != PlaybackState::Loading {
            return;
        }

        self.mark_loaded();
        if let Some(s) = self.session.as_mut() {
            s.error_count = 0;
            s.budget.reset_network();
        }
        self.state = PlaybackState::Ready;
        info!("Stream ready");
        self.emit(PlayerEvent::Ready);

        let resume = self
            .session
            .as_mut()
            .map(|s| std::mem::take(&mut s.resume_on_ready))
            .unwrap_or(false);
        if self.config.auto_play || resume {
            if let Err(e) = self.play() {
                warn!("Auto-play failed: {}", e);
            }
        }
    }

    fn on_decoder_error(&mut self, err: DecoderError) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.error_count += 1;

        if !err.fatal {
            debug!("Transient {:?} error: {} (count {})", err.kind, err.details, session.error_count);
            if session.error_count > self.config.max_error_count {
                warn!("Error count exceeded {}, trying alternate format", self.config.max_error_count);
                session.error_count = 0;
                if !self.try_fallback() {
                    debug!("No alternate format, continuing on current stream");
                }
            }
            return;
        }

        match err.kind {
            ErrorType::Network => {
                if session.budget.take_network_retry(err.details.stage()) {
                    warn!("Fatal network error ({}), reloading source", err.details);
                    if let Err(e) = self.with_backend(|b| b.start_load()) {
                        self.fail_over(PlaybackError::Network(e.to_string()));
                    }
                } else {
                    self.fail_over(PlaybackError::Network(err.details.to_string()));
                }
            }
            ErrorType::Media => {
                if session.budget.take_media_recovery() {
                    warn!("Fatal media error ({}), attempting recovery", err.details);
                    if let Err(e) = self.with_backend(|b| b.recover_media_error()) {
                        self.fail_over(PlaybackError::Media(e.to_string()));
                    }
                } else {
                    self.fail_over(PlaybackError::Media(err.details.to_string()));
                }
            }
            ErrorType::Other => self.fail_over(PlaybackError::Format(err.details.to_string())),
        }
    }

    fn on_native_failure(&mut self, reason: String) {
        warn!("Native playback failed: {}", reason);
        if let Some(s) = self.session.as_mut() {
            s.error_count += 1;
        }
        self.release_backend();
        if !self.try_fallback() {
            self.fail(PlaybackError::Format(reason));
        }
    }

    /// Destroy the decoder and switch format, or give up
    fn fail_over(&mut self, cause: PlaybackError) {
        warn!("Unrecoverable on current source: {} ({})", cause, cause.details());
        self.release_backend();
        if !self.try_fallback() {
            self.fail(PlaybackError::Unrecoverable(cause.details().to_string()));
        }
    }

    /// Reload with the alternate format if the budget allows
    fn try_fallback(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.budget.fallback_available() {
            return false;
        }
        let Some(url) = self.resolver.fallback(&session.stream_url) else {
            return false;
        };
        session.budget.take_fallback();

        info!("Falling back from {} to {}", session.stream_url, url);
        self.release_backend();

        let kind = self.select_backend(&url);
        let id = self.allocate_session();
        if let Some(s) = self.session.as_mut() {
            s.id = id;
            s.stream_url = url.clone();
            s.backend_kind = kind;
            s.error_count = 0;
            s.is_loading = true;
            s.resume_on_ready = s.is_playing;
            s.is_playing = false;
            s.budget.reset_for_new_source();
        }
        self.state = PlaybackState::Loading;

        match self.start_backend(id, kind, &url) {
            Ok(()) => true,
            Err(e) => {
                self.fail(PlaybackError::Unrecoverable(e.to_string()));
                true
            }
        }
    }

    fn fail(&mut self, err: PlaybackError) {
        debug_assert!(err.is_terminal(), "non-terminal error reported: {:?}", err);
        error!("Playback failed: {} ({})", err, err.details());
        self.release_backend();
        if let Some(s) = self.session.as_mut() {
            s.is_playing = false;
            s.is_loading = false;
        }
        self.state = PlaybackState::Error;
        self.emit(PlayerEvent::Error {
            message: err.to_string(),
        });
    }

    fn select_backend(&self, url: &str) -> BackendKind {
        if !StreamFormat::from_url(url).is_adaptive() {
            return BackendKind::Native;
        }
        if self.factory.adaptive_supported() {
            return BackendKind::Adaptive;
        }
        if !self.factory.native_plays_hls() {
            warn!("Adaptive decoder unavailable, trying native HLS playback anyway");
        }
        BackendKind::Native
    }

    fn allocate_session(&mut self) -> SessionId {
        self.next_session += 1;
        SessionId(self.next_session)
    }

    fn start_backend(&mut self, id: SessionId, kind: BackendKind, url: &str) -> Result<()> {
        let mut backend = self.factory.create(kind, &self.config.retry)?;

        let subscriptions = EventTopic::ALL
            .iter()
            .map(|topic| backend.subscribe(id, *topic))
            .collect();
        // Registered before anything can fail so release() cleans up
        self.live = Some(LiveBackend {
            backend,
            subscriptions,
        });

        let (muted, volume) = self
            .session
            .as_ref()
            .map(|s| (s.is_muted, s.volume))
            .unwrap_or((false, 1.0));

        self.with_backend(|b| {
            b.set_muted(muted);
            b.set_volume(volume);
            if kind == BackendKind::Adaptive {
                b.attach_media()?;
            }
            b.load_source(url)
        })
        .map_err(|e| {
            self.release_backend();
            e
        })?;

        debug!("Started {:?} backend for {}", kind, id);
        Ok(())
    }

    fn with_backend<T>(&mut self, f: impl FnOnce(&mut dyn MediaBackend) -> Result<T>) -> Result<T> {
        match self.live.as_mut() {
            Some(live) => f(live.backend.as_mut()),
            None => Err(internal_error!("no live backend")),
        }
    }

    fn release_backend(&mut self) {
        if let Some(live) = self.live.take() {
            live.release();
        }
    }

    fn mark_loaded(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.is_loading = false;
        }
    }

    fn enter_playing(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.is_playing = true;
        }
        self.state = PlaybackState::Playing;
        info!("Playback started");
        self.emit(PlayerEvent::Play);
    }

    fn enter_paused(&mut self) {
        if let Some(s) = self.session.as_mut() {
            s.is_playing = false;
        }
        self.state = PlaybackState::Paused;
        info!("Playback paused");
        self.emit(PlayerEvent::Pause);
    }

    /// Send event to handlers
    fn emit(&mut self, event: PlayerEvent) {
        for handler in self.handlers.iter_mut() {
            handler.handle_event(&event);
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
