//! Program guide collaborator
//!
//! Guide data is fetched asynchronously and independently of playback. A
//! failed fetch never affects the player; the guide is simply empty.

use crate::media::Channel;
use crate::utils::error::Result;
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// One scheduled program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramEntry {
    pub channel_id: String,
    pub title: String,

    /// Start time, unix seconds
    pub start: i64,

    /// End time, unix seconds (exclusive)
    pub stop: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProgramEntry {
    pub fn is_airing(&self, now: i64) -> bool {
        self.start <= now && now < self.stop
    }
}

/// Source of guide data for channels
#[async_trait]
pub trait EpgService: Send + Sync {
    /// Programs for `channel`; `None` when the source has no guide for it
    async fn fetch_programs(&self, channel: &Channel) -> Result<Option<Vec<ProgramEntry>>>;
}

/// Guide for `channel`, sorted by start time
///
/// Fetch failures are logged and yield an empty guide.
pub async fn load_guide(service: &dyn EpgService, channel: &Channel) -> Vec<ProgramEntry> {
    match service.fetch_programs(channel).await {
        Ok(Some(mut programs)) => {
            programs.sort_by_key(|p| p.start);
            debug!("Loaded {} programs for {}", programs.len(), channel.id);
            programs
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("Guide unavailable for {}: {}", channel.id, e);
            Vec::new()
        }
    }
}

/// Program airing at `now` (unix seconds)
pub fn current_program(programs: &[ProgramEntry], now: i64) -> Option<&ProgramEntry> {
    programs.iter().find(|p| p.is_airing(now))
}
