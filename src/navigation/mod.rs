//! Channel and episode navigation
//!
//! Channels wrap around at both ends of their playlist. Episodes follow
//! numeric order inside a season and continue into the neighbouring
//! season that has at least one episode; there is no wrap-around at the
//! ends of a series.

use crate::media::{Channel, Episode, Playlist, Series};
use crate::utils::{wrap_next, wrap_prev};
use log::debug;

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Circular successor of `current_id`; `None` if it is not in the playlist
pub fn next_channel<'a>(playlist: &'a Playlist, current_id: &str) -> Option<&'a Channel> {
    let index = playlist.position(current_id)?;
    Some(&playlist.channels()[wrap_next(index, playlist.len())])
}

/// Circular predecessor of `current_id`; `None` if it is not in the playlist
pub fn prev_channel<'a>(playlist: &'a Playlist, current_id: &str) -> Option<&'a Channel> {
    let index = playlist.position(current_id)?;
    Some(&playlist.channels()[wrap_prev(index, playlist.len())])
}

/// Neighbours of an episode in playback order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdjacentEpisodes<'a> {
    pub prev: Option<&'a Episode>,
    pub next: Option<&'a Episode>,
}

/// Previous/next episode of `episode_id`, crossing season boundaries
///
/// Seasons without episodes are skipped. Both sides are `None` if the
/// episode is not part of the series.
pub fn adjacent_episodes<'a>(series: &'a Series, episode_id: &str) -> AdjacentEpisodes<'a> {
    let Some((si, ei)) = series.locate(episode_id) else {
        return AdjacentEpisodes::default();
    };
    let seasons = series.seasons();
    let episodes = &seasons[si].episodes;

    let next = episodes.get(ei + 1).or_else(|| {
        seasons[si + 1..]
            .iter()
            .find_map(|season| season.episodes.first())
    });

    let prev = match ei.checked_sub(1) {
        Some(i) => episodes.get(i),
        None => seasons[..si]
            .iter()
            .rev()
            .find_map(|season| season.episodes.last()),
    };

    AdjacentEpisodes { prev, next }
}

/// Stateful channel navigation over one playlist
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    playlist: Playlist,
    current: Option<String>,
}

impl ChannelNavigator {
    pub fn new(playlist: Playlist) -> Self {
        let current = playlist.channels().first().map(|c| c.id.clone());
        Self { playlist, current }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current(&self) -> Option<&Channel> {
        self.current.as_deref().and_then(|id| self.playlist.get(id))
    }

    /// Jump to a channel; unknown ids leave the selection unchanged
    pub fn select(&mut self, id: &str) -> Option<&Channel> {
        if self.playlist.position(id).is_some() {
            self.current = Some(id.to_string());
        }
        self.current()
    }

    /// Move one channel in `direction` and return the new current channel
    pub fn step(&mut self, direction: Direction) -> Option<&Channel> {
        let id = self.current.as_deref()?;
        let target = match direction {
            Direction::Next => next_channel(&self.playlist, id),
            Direction::Previous => prev_channel(&self.playlist, id),
        }?;
        debug!("Channel {:?}: {} -> {}", direction, id, target.id);
        self.current = Some(target.id.clone());
        self.current()
    }
}

/// Stateful episode navigation over one series
#[derive(Debug, Clone)]
pub struct EpisodeNavigator {
    series: Series,
    current: Option<String>,
}

impl EpisodeNavigator {
    pub fn new(series: Series) -> Self {
        let current = series.episodes().next().map(|e| e.id.clone());
        Self { series, current }
    }

    pub fn current(&self) -> Option<&Episode> {
        self.current.as_deref().and_then(|id| self.series.episode(id))
    }

    pub fn select(&mut self, id: &str) -> Option<&Episode> {
        if self.series.locate(id).is_some() {
            self.current = Some(id.to_string());
        }
        self.current()
    }

    pub fn adjacent(&self) -> AdjacentEpisodes<'_> {
        match self.current.as_deref() {
            Some(id) => adjacent_episodes(&self.series, id),
            None => AdjacentEpisodes::default(),
        }
    }

    /// Move one episode in `direction`; stays put at either end of the series
    pub fn step(&mut self, direction: Direction) -> Option<&Episode> {
        let adjacent = self.adjacent();
        let target = match direction {
            Direction::Next => adjacent.next,
            Direction::Previous => adjacent.prev,
        }?;
        self.current = Some(target.id.clone());
        self.current()
    }
}
