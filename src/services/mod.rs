//! External collaborators consumed by the player core
//!
//! - Playlist storage, whose failures surface as [`Notice`]s
//! - Program guide (EPG) source

pub mod epg;
pub mod playlist_store;

pub use epg::{current_program, load_guide, EpgService, ProgramEntry};
pub use playlist_store::{save_playlist_with_notice, JsonFilePlaylistStore, PlaylistStore};

use std::fmt;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Non-fatal message for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            NoticeLevel::Info => write!(f, "{}", self.message),
            NoticeLevel::Warning => write!(f, "warning: {}", self.message),
        }
    }
}
