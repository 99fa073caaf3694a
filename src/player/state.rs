//! Per-item playback session state
//!
//! A [`PlaybackSession`] lives from the moment an item is loaded until the
//! next item is loaded or the engine is disposed. It carries the user-facing
//! flags plus the recovery bookkeeping that bounds retries and fallbacks.

use crate::player::backend::{BackendKind, LoadStage, SessionId};
use crate::utils::config::{PlayerConfig, RetryPolicy};

/// Ephemeral state for the active item
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    /// Current backend instance
    pub id: SessionId,

    /// Item being played
    pub item_id: String,

    /// URL the item was loaded with
    pub original_url: String,

    /// URL currently playing, possibly format-substituted
    pub stream_url: String,

    /// Strategy of the current backend
    pub backend_kind: BackendKind,

    pub is_playing: bool,
    pub is_muted: bool,

    /// Volume level (0.0 to 1.0)
    pub volume: f32,

    /// True until the backend reports ready
    pub is_loading: bool,

    /// Error events since the last reset
    pub error_count: u32,

    /// Resume playback once a replacement source is ready
    pub(crate) resume_on_ready: bool,

    pub(crate) budget: RecoveryBudget,
}

impl PlaybackSession {
    pub(crate) fn new(
        id: SessionId,
        item_id: &str,
        url: &str,
        backend_kind: BackendKind,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            id,
            item_id: item_id.to_string(),
            original_url: url.to_string(),
            stream_url: url.to_string(),
            backend_kind,
            is_playing: false,
            is_muted: config.start_muted,
            volume: config.default_volume.clamp(0.0, 1.0),
            is_loading: true,
            error_count: 0,
            resume_on_ready: false,
            budget: RecoveryBudget::new(config),
        }
    }

    /// Whether a format fallback has already been used
    pub fn fallback_used(&self) -> bool {
        self.budget.fallbacks_used > 0
    }
}

/// Retry/recovery allowances for one load
#[derive(Debug, Clone)]
pub(crate) struct RecoveryBudget {
    retry: RetryPolicy,
    manifest_retries: u32,
    level_retries: u32,
    fragment_retries: u32,
    max_media_recoveries: u32,
    media_recoveries: u32,
    max_fallbacks: u32,
    fallbacks_used: u32,
}

impl RecoveryBudget {
    pub(crate) fn new(config: &PlayerConfig) -> Self {
        Self {
            retry: config.retry,
            manifest_retries: 0,
            level_retries: 0,
            fragment_retries: 0,
            max_media_recoveries: config.max_media_recoveries,
            media_recoveries: 0,
            max_fallbacks: config.max_fallbacks_per_load,
            fallbacks_used: 0,
        }
    }

    /// Consume one network retry for `stage`; false once exhausted
    ///
    /// Errors without a known stage count against the fragment budget.
    pub(crate) fn take_network_retry(&mut self, stage: Option<LoadStage>) -> bool {
        let (used, limit) = match stage {
            Some(LoadStage::Manifest) => (&mut self.manifest_retries, self.retry.manifest),
            Some(LoadStage::Level) => (&mut self.level_retries, self.retry.level),
            Some(LoadStage::Fragment) | None => (&mut self.fragment_retries, self.retry.fragment),
        };
        if *used >= limit {
            return false;
        }
        *used += 1;
        true
    }

    pub(crate) fn take_media_recovery(&mut self) -> bool {
        if self.media_recoveries >= self.max_media_recoveries {
            return false;
        }
        self.media_recoveries += 1;
        true
    }

    pub(crate) fn take_fallback(&mut self) -> bool {
        if self.fallbacks_used >= self.max_fallbacks {
            return false;
        }
        self.fallbacks_used += 1;
        true
    }

    pub(crate) fn fallback_available(&self) -> bool {
        self.fallbacks_used < self.max_fallbacks
    }

    /// Fresh network allowances once a stream is up again
    pub(crate) fn reset_network(&mut self) {
        self.manifest_retries = 0;
        self.level_retries = 0;
        self.fragment_retries = 0;
    }

    /// Fresh per-source allowances after switching URL
    pub(crate) fn reset_for_new_source(&mut self) {
        self.reset_network();
        self.media_recoveries = 0;
    }
}
