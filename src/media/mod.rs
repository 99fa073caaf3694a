//! Media data model
//!
//! This module defines the playable items the player core works with:
//! - Live channels grouped in a [`Playlist`]
//! - Movies
//! - Series episodes organised in seasons
//!
//! Numeric season/episode fields arrive as text from the catalogue
//! collaborator and are normalised into integers in [`series`].

pub mod m3u;
pub mod series;

pub use m3u::parse_m3u;
pub use series::{Episode, RawEpisode, RawSeason, RawSeries, Season, Series};

use crate::utils::error::IptvError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Live channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Unique id within its playlist
    pub id: String,

    /// Display name
    pub name: String,

    /// Stream URL
    pub url: String,

    /// Channel logo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// EPG channel identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epg_id: Option<String>,

    /// Group/category title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Channel {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            logo_url: None,
            epg_id: None,
            group: None,
        }
    }
}

/// Video-on-demand movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// Kind of playable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Channel,
    Movie,
    Episode,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ItemKind::Channel => "channel",
            ItemKind::Movie => "movie",
            ItemKind::Episode => "episode",
        };
        f.write_str(name)
    }
}

/// Anything the playback engine can be given
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayableItem {
    Channel(Channel),
    Movie(Movie),
    Episode(Episode),
}

impl PlayableItem {
    pub fn id(&self) -> &str {
        match self {
            PlayableItem::Channel(c) => &c.id,
            PlayableItem::Movie(m) => &m.id,
            PlayableItem::Episode(e) => &e.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PlayableItem::Channel(c) => &c.name,
            PlayableItem::Movie(m) => &m.name,
            PlayableItem::Episode(e) => &e.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            PlayableItem::Channel(c) => &c.url,
            PlayableItem::Movie(m) => &m.url,
            PlayableItem::Episode(e) => &e.url,
        }
    }

    pub fn logo_url(&self) -> Option<&str> {
        match self {
            PlayableItem::Channel(c) => c.logo_url.as_deref(),
            PlayableItem::Movie(m) => m.logo_url.as_deref(),
            PlayableItem::Episode(e) => e.logo_url.as_deref(),
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            PlayableItem::Channel(_) => ItemKind::Channel,
            PlayableItem::Movie(_) => ItemKind::Movie,
            PlayableItem::Episode(_) => ItemKind::Episode,
        }
    }
}

impl From<Channel> for PlayableItem {
    fn from(channel: Channel) -> Self {
        PlayableItem::Channel(channel)
    }
}

impl From<Movie> for PlayableItem {
    fn from(movie: Movie) -> Self {
        PlayableItem::Movie(movie)
    }
}

impl From<Episode> for PlayableItem {
    fn from(episode: Episode) -> Self {
        PlayableItem::Episode(episode)
    }
}

/// Ordered channel collection
///
/// Insertion order defines navigation adjacency, which wraps around at
/// both ends. Channel ids are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PlaylistRecord")]
pub struct Playlist {
    name: String,
    channels: Vec<Channel>,
}

#[derive(Deserialize)]
struct PlaylistRecord {
    #[serde(default)]
    name: String,
    channels: Vec<Channel>,
}

impl TryFrom<PlaylistRecord> for Playlist {
    type Error = IptvError;

    fn try_from(record: PlaylistRecord) -> Result<Self, Self::Error> {
        Playlist::new(record.name, record.channels)
    }
}

impl Playlist {
    /// Build a playlist, rejecting duplicate channel ids
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> crate::Result<Self> {
        let mut seen = HashSet::with_capacity(channels.len());
        for channel in &channels {
            if !seen.insert(channel.id.as_str()) {
                return Err(IptvError::invalid_input(format!(
                    "duplicate channel id '{}'",
                    channel.id
                )));
            }
        }

        Ok(Self {
            name: name.into(),
            channels,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Index of the channel with the given id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.channels.iter().position(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.id == id)
    }
}
