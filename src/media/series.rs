//! Series, seasons and episodes
//!
//! The catalogue delivers season and episode numbers as text. They are
//! parsed into integers once, here, so everything downstream compares
//! numbers rather than strings.

use crate::utils::error::{IptvError, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Single episode, normalised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub season_number: u32,
    pub episode_number: u32,
}

/// Season with its episodes sorted by episode number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub season_number: u32,
    pub episodes: Vec<Episode>,
}

/// Series with seasons sorted by season number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SeriesRecord")]
pub struct Series {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    seasons: Vec<Season>,
}

#[derive(Deserialize)]
struct SeriesRecord {
    id: String,
    name: String,
    #[serde(default)]
    logo_url: Option<String>,
    #[serde(default)]
    seasons: Vec<Season>,
}

impl From<SeriesRecord> for Series {
    fn from(record: SeriesRecord) -> Self {
        let mut series = Series::new(record.id, record.name, record.seasons);
        series.logo_url = record.logo_url;
        series
    }
}

impl Series {
    /// Build a series; seasons and episodes are sorted (stable) on the way in
    pub fn new(id: impl Into<String>, name: impl Into<String>, mut seasons: Vec<Season>) -> Self {
        seasons.sort_by_key(|s| s.season_number);
        for season in &mut seasons {
            season.episodes.sort_by_key(|e| e.episode_number);
        }

        Self {
            id: id.into(),
            name: name.into(),
            logo_url: None,
            seasons,
        }
    }

    pub fn seasons(&self) -> &[Season] {
        &self.seasons
    }

    /// Total number of episodes across all seasons
    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }

    /// Episodes in playback order
    pub fn episodes(&self) -> impl Iterator<Item = &Episode> {
        self.seasons.iter().flat_map(|s| s.episodes.iter())
    }

    /// Locate an episode by id as (season index, episode index)
    pub fn locate(&self, episode_id: &str) -> Option<(usize, usize)> {
        self.seasons.iter().enumerate().find_map(|(si, season)| {
            season
                .episodes
                .iter()
                .position(|e| e.id == episode_id)
                .map(|ei| (si, ei))
        })
    }

    pub fn episode(&self, episode_id: &str) -> Option<&Episode> {
        self.locate(episode_id)
            .map(|(si, ei)| &self.seasons[si].episodes[ei])
    }
}

/// Series as delivered by the catalogue, numbers as text
#[derive(Debug, Clone, Deserialize)]
pub struct RawSeries {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cover: Option<String>,
    pub seasons: Vec<RawSeason>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSeason {
    #[serde(deserialize_with = "number_text")]
    pub season_number: String,
    #[serde(default)]
    pub episodes: Vec<RawEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEpisode {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(deserialize_with = "number_text")]
    pub episode_number: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Accept either `"3"` or `3` for numeric catalogue fields
fn number_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(u64),
        Text(String),
    }

    Ok(match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n.to_string(),
        NumberOrText::Text(s) => s,
    })
}

fn parse_number(field: &str, value: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| {
        IptvError::invalid_input(format!("{} '{}' is not a non-negative integer", field, value))
    })
}

impl TryFrom<RawSeries> for Series {
    type Error = IptvError;

    fn try_from(raw: RawSeries) -> Result<Self> {
        let mut seasons = Vec::with_capacity(raw.seasons.len());
        for raw_season in raw.seasons {
            let season_number = parse_number("season number", &raw_season.season_number)?;
            let episodes = raw_season
                .episodes
                .into_iter()
                .map(|e| {
                    Ok(Episode {
                        episode_number: parse_number("episode number", &e.episode_number)?,
                        season_number,
                        id: e.id,
                        name: e.title,
                        url: e.url,
                        logo_url: e.thumbnail,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            seasons.push(Season {
                season_number,
                episodes,
            });
        }

        let mut series = Series::new(raw.id, raw.name, seasons);
        series.logo_url = raw.cover;
        Ok(series)
    }
}
