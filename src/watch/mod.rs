//! Watch-time tracking
//!
//! [`WatchTimeTracker`] accrues viewing time for the active item and
//! flushes it to a [`WatchHistory`] periodically while playing and once
//! more whenever playback stops. Samples at or below the minimum duration
//! are dropped.

mod history;

pub use history::{InMemoryHistory, JsonLinesHistory, WatchHistory, WatchSample};

use crate::media::{ItemKind, PlayableItem};
use crate::utils::config::WatchConfig;
use log::{debug, warn};
use std::time::{Duration, Instant};

/// Identity of the item being tracked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchItem {
    pub id: String,
    pub label: String,
    pub kind: ItemKind,
    pub thumbnail: Option<String>,
}

impl From<&PlayableItem> for WatchItem {
    fn from(item: &PlayableItem) -> Self {
        Self {
            id: item.id().to_string(),
            label: item.name().to_string(),
            kind: item.kind(),
            thumbnail: item.logo_url().map(str::to_string),
        }
    }
}

/// Accrues elapsed playback time per item
pub struct WatchTimeTracker<H: WatchHistory> {
    history: H,
    flush_interval: Duration,
    min_duration: Duration,
    item: Option<WatchItem>,
    started_at: Option<Instant>,
    playing: bool,
}

impl<H: WatchHistory> WatchTimeTracker<H> {
    pub fn new(history: H, config: &WatchConfig) -> Self {
        Self {
            history,
            flush_interval: Duration::from_secs(config.flush_interval_secs),
            min_duration: Duration::from_secs(config.min_duration_secs),
            item: None,
            started_at: None,
            playing: false,
        }
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn active_item(&self) -> Option<&WatchItem> {
        self.item.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start tracking `item`; a previously active item gets its final flush
    pub fn activate(&mut self, item: impl Into<WatchItem>, now: Instant) {
        if self.item.is_some() {
            self.stop(now);
        }
        let item = item.into();
        debug!("Tracking watch time for {}", item.id);
        self.item = Some(item);
        self.started_at = Some(now);
        self.playing = false;
    }

    pub fn on_play(&mut self, now: Instant) {
        if self.item.is_none() || self.playing {
            return;
        }
        self.playing = true;
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub fn on_pause(&mut self, now: Instant) {
        self.stop(now);
    }

    pub fn on_ended(&mut self, now: Instant) {
        self.stop(now);
    }

    /// Periodic flush while playing; returns true if a sample was recorded
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.playing {
            return false;
        }
        match self.started_at {
            Some(start) if now.saturating_duration_since(start) >= self.flush_interval => {
                self.flush(now, true)
            }
            _ => false,
        }
    }

    /// Final flush and release of the active item
    pub fn unmount(&mut self, now: Instant) {
        self.stop(now);
        self.item = None;
    }

    fn stop(&mut self, now: Instant) {
        self.flush(now, false);
        self.playing = false;
    }

    fn flush(&mut self, now: Instant, keep_running: bool) -> bool {
        let (Some(item), Some(start)) = (self.item.as_ref(), self.started_at) else {
            return false;
        };

        let elapsed = now.saturating_duration_since(start);
        let elapsed_secs = elapsed.as_secs();
        let recorded = elapsed_secs > self.min_duration.as_secs();
        if recorded {
            let sample = WatchSample {
                item_id: item.id.clone(),
                label: item.label.clone(),
                kind: item.kind,
                elapsed_secs,
                thumbnail: item.thumbnail.clone(),
            };
            if let Err(e) = self.history.record(&sample) {
                warn!("Failed to record watch time for {}: {}", sample.item_id, e);
            }
        }

        self.started_at = if keep_running {
            if recorded { Some(now) } else { Some(start) }
        } else {
            None
        };
        recorded
    }
}

impl<H: WatchHistory> Drop for WatchTimeTracker<H> {
    fn drop(&mut self) {
        if self.item.is_some() {
            self.unmount(Instant::now());
        }
    }
}
