//! Persistent playlist storage
//!
//! Storage can fail (quota, permissions). [`save_playlist_with_notice`]
//! turns such failures into a [`Notice`] for the UI instead of an error.

use crate::media::Playlist;
use crate::services::Notice;
use crate::utils::error::{IntoIptvError, IptvError, Result};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Keyed playlist storage
pub trait PlaylistStore {
    /// Stored playlist, `None` when nothing was saved yet
    fn get_playlist(&self) -> Result<Option<Playlist>>;

    fn save_playlist(&mut self, playlist: &Playlist) -> Result<()>;
}

/// Playlist stored as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFilePlaylistStore {
    path: PathBuf,
    quota_bytes: Option<usize>,
}

impl JsonFilePlaylistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota_bytes: None,
        }
    }

    /// Store under the application data directory
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("playlist.json"))
    }

    /// Reject documents larger than `bytes`
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota_bytes = Some(bytes);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlaylistStore for JsonFilePlaylistStore {
    fn get_playlist(&self) -> Result<Option<Playlist>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path).storage_err("Reading playlist")?;
        let playlist = serde_json::from_str(&content)?;
        Ok(Some(playlist))
    }

    fn save_playlist(&mut self, playlist: &Playlist) -> Result<()> {
        let content = serde_json::to_string_pretty(playlist)?;
        if let Some(limit) = self.quota_bytes {
            if content.len() > limit {
                return Err(IptvError::QuotaExceeded {
                    needed: content.len(),
                    limit,
                });
            }
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).storage_err("Creating playlist directory")?;
        }
        fs::write(&self.path, content).storage_err("Writing playlist")?;
        info!("Saved playlist '{}' to {:?}", playlist.name(), self.path);
        Ok(())
    }
}

/// Save `playlist`, reporting failure as a notice rather than an error
pub fn save_playlist_with_notice<S: PlaylistStore + ?Sized>(
    store: &mut S,
    playlist: &Playlist,
) -> Option<Notice> {
    match store.save_playlist(playlist) {
        Ok(()) => None,
        Err(e) => {
            warn!("Failed to save playlist '{}': {}", playlist.name(), e);
            let message = match e {
                IptvError::QuotaExceeded { .. } => {
                    "Playlist is too large to store on this device".to_string()
                }
                other => format!("Playlist could not be saved: {}", other),
            };
            Some(Notice::warning(message))
        }
    }
}
