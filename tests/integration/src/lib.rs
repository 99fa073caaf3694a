//! Integration test utilities for the IPTV player core
//!
//! This module provides common utilities for integration testing including:
//! - A scripted media backend that journals every call
//! - Playlist and series fixtures on disk
//! - An event recorder for engine output

use anyhow::Result;
use iptvplayer::media::{Channel, Playlist};
use iptvplayer::player::{
    BackendFactory, BackendKind, EventTopic, MediaBackend, PlayerEvent, PlayerEventHandler,
    SessionId, SubscriptionId,
};
use iptvplayer::utils::RetryPolicy;
use iptvplayer::IptvError;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

/// Everything the scripted backends were asked to do
#[derive(Debug, Default)]
pub struct BackendJournal {
    /// Kind of every backend created, in order
    pub created: Vec<BackendKind>,

    /// URLs passed to `load_source`, in order
    pub loaded_urls: Vec<String>,

    /// Sessions subscriptions were registered under
    pub sessions: Vec<SessionId>,

    /// Subscriptions not yet released
    pub open_subscriptions: usize,

    pub destroyed: usize,
    pub start_load_calls: usize,
    pub media_recoveries: usize,
    pub play_calls: usize,
    pub pause_calls: usize,
}

impl BackendJournal {
    /// Backends created but not destroyed
    pub fn live_backends(&self) -> usize {
        self.created.len() - self.destroyed
    }
}

/// Shared handle on the journal
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<BackendJournal>>);

impl Journal {
    pub fn with<T>(&self, f: impl FnOnce(&BackendJournal) -> T) -> T {
        f(&self.0.borrow())
    }

    fn update(&self, f: impl FnOnce(&mut BackendJournal)) {
        f(&mut self.0.borrow_mut())
    }
}

/// Factory producing [`ScriptedBackend`]s
pub struct ScriptedFactory {
    journal: Journal,
    adaptive_supported: bool,
    native_plays_hls: bool,
}

impl ScriptedFactory {
    pub fn new() -> (Self, Journal) {
        let journal = Journal::default();
        let factory = Self {
            journal: journal.clone(),
            adaptive_supported: true,
            native_plays_hls: false,
        };
        (factory, journal)
    }

    /// Platform without the adaptive decoder
    pub fn without_adaptive(mut self, native_plays_hls: bool) -> Self {
        self.adaptive_supported = false;
        self.native_plays_hls = native_plays_hls;
        self
    }
}

impl BackendFactory for ScriptedFactory {
    fn adaptive_supported(&self) -> bool {
        self.adaptive_supported
    }

    fn native_plays_hls(&self) -> bool {
        self.native_plays_hls
    }

    fn create(&mut self, kind: BackendKind, _retry: &RetryPolicy) -> iptvplayer::Result<Box<dyn MediaBackend>> {
        self.journal.update(|j| j.created.push(kind));
        Ok(Box::new(ScriptedBackend {
            kind,
            journal: self.journal.clone(),
            next_subscription: 0,
            destroyed: false,
        }))
    }
}

/// Backend that records calls and never produces events on its own
pub struct ScriptedBackend {
    kind: BackendKind,
    journal: Journal,
    next_subscription: u64,
    destroyed: bool,
}

impl ScriptedBackend {
    fn check_alive(&self) -> iptvplayer::Result<()> {
        if self.destroyed {
            return Err(IptvError::Backend("backend already destroyed".to_string()));
        }
        Ok(())
    }
}

impl MediaBackend for ScriptedBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn subscribe(&mut self, session: SessionId, _topic: EventTopic) -> SubscriptionId {
        self.next_subscription += 1;
        self.journal.update(|j| {
            j.open_subscriptions += 1;
            if j.sessions.last() != Some(&session) {
                j.sessions.push(session);
            }
        });
        SubscriptionId(self.next_subscription)
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) {
        self.journal.update(|j| j.open_subscriptions -= 1);
    }

    fn attach_media(&mut self) -> iptvplayer::Result<()> {
        self.check_alive()
    }

    fn load_source(&mut self, url: &str) -> iptvplayer::Result<()> {
        self.check_alive()?;
        self.journal.update(|j| j.loaded_urls.push(url.to_string()));
        Ok(())
    }

    fn start_load(&mut self) -> iptvplayer::Result<()> {
        self.check_alive()?;
        self.journal.update(|j| j.start_load_calls += 1);
        Ok(())
    }

    fn recover_media_error(&mut self) -> iptvplayer::Result<()> {
        self.check_alive()?;
        self.journal.update(|j| j.media_recoveries += 1);
        Ok(())
    }

    fn play(&mut self) -> iptvplayer::Result<()> {
        self.check_alive()?;
        self.journal.update(|j| j.play_calls += 1);
        Ok(())
    }

    fn pause(&mut self) -> iptvplayer::Result<()> {
        self.check_alive()?;
        self.journal.update(|j| j.pause_calls += 1);
        Ok(())
    }

    fn set_muted(&mut self, _muted: bool) {}

    fn set_volume(&mut self, _volume: f32) {}

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.journal.update(|j| j.destroyed += 1);
        }
    }
}

/// Collects engine output for assertions
#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<PlayerEvent>>>);

impl EventLog {
    pub fn handler(&self) -> Box<dyn PlayerEventHandler> {
        let events = self.0.clone();
        Box::new(move |event: &PlayerEvent| events.borrow_mut().push(event.clone()))
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        self.0.borrow().clone()
    }

    /// Messages of all error events
    pub fn errors(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                PlayerEvent::Error { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Playlist with channels `a`, `b`, `c`
pub fn abc_playlist() -> Playlist {
    let channels = ["a", "b", "c"]
        .iter()
        .map(|id| Channel::new(*id, id.to_uppercase(), format!("http://x/{}.m3u8", id)))
        .collect();
    Playlist::new("abc", channels).expect("fixture ids are unique")
}

pub const SAMPLE_M3U: &str = "#EXTM3U
#EXTINF:-1 tvg-id=\"news\" tvg-logo=\"http://x/news.png\" group-title=\"News\",News 24
http://x/news.m3u8
#EXTINF:-1 tvg-id=\"movies\" group-title=\"Film\",Movies
http://x/movies.mp4
#EXTINF:-1,Radio
http://x/radio.aac
";

pub const SAMPLE_SERIES_JSON: &str = r#"{
  "id": "show",
  "name": "Show",
  "seasons": [
    { "season_number": "2", "episodes": [
      { "id": "s2e1", "title": "Two One", "url": "http://x/s2e1.mp4", "episode_number": "1" }
    ] },
    { "season_number": "1", "episodes": [
      { "id": "s1e10", "title": "One Ten", "url": "http://x/s1e10.mp4", "episode_number": "10" },
      { "id": "s1e2", "title": "One Two", "url": "http://x/s1e2.mp4", "episode_number": 2 }
    ] },
    { "season_number": "3", "episodes": [] }
  ]
}"#;

/// Test fixture with sample documents on disk
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub playlist_m3u: PathBuf,
    pub series_json: PathBuf,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let playlist_m3u = temp_dir.path().join("sample.m3u");
        std::fs::write(&playlist_m3u, SAMPLE_M3U)?;
        let series_json = temp_dir.path().join("series.json");
        std::fs::write(&series_json, SAMPLE_SERIES_JSON)?;

        Ok(Self {
            temp_dir,
            playlist_m3u,
            series_json,
        })
    }

    /// Get the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}
