//! Watch-history collaborators
//!
//! The tracker hands finished samples to a [`WatchHistory`]. Recording is
//! fire-and-forget from the tracker's point of view: failures are logged
//! by the tracker, never propagated to playback.

use crate::media::ItemKind;
use crate::utils::error::{IntoIptvError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Accrued viewing time for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSample {
    pub item_id: String,

    /// Display label
    pub label: String,

    pub kind: ItemKind,

    /// Whole seconds watched since the previous flush
    pub elapsed_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Sink for watch-time samples
pub trait WatchHistory {
    /// Record one sample
    fn record(&mut self, sample: &WatchSample) -> Result<()>;
}

impl<H: WatchHistory + ?Sized> WatchHistory for Box<H> {
    fn record(&mut self, sample: &WatchSample) -> Result<()> {
        (**self).record(sample)
    }
}

/// History kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    samples: Vec<WatchSample>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[WatchSample] {
        &self.samples
    }

    /// Total recorded seconds for `item_id`
    pub fn total_secs(&self, item_id: &str) -> u64 {
        self.samples
            .iter()
            .filter(|s| s.item_id == item_id)
            .map(|s| s.elapsed_secs)
            .sum()
    }
}

impl WatchHistory for InMemoryHistory {
    fn record(&mut self, sample: &WatchSample) -> Result<()> {
        self.samples.push(sample.clone());
        Ok(())
    }
}

/// History appended to a JSON-lines file, one sample per line
#[derive(Debug, Clone)]
pub struct JsonLinesHistory {
    path: PathBuf,
}

impl JsonLinesHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every recorded sample; a missing file means no history
    pub fn load(&self) -> Result<Vec<WatchSample>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&self.path)?;
        let mut samples = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            samples.push(serde_json::from_str(&line)?);
        }
        Ok(samples)
    }
}

impl WatchHistory for JsonLinesHistory {
    fn record(&mut self, sample: &WatchSample) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).storage_err("Creating history directory")?;
        }
        let line = serde_json::to_string(sample)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .storage_err("Opening history file")?;
        writeln!(file, "{}", line).storage_err("Writing history")?;
        Ok(())
    }
}
