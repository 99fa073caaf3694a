//! Neighbour prefetching for channel zapping
//!
//! [`ChannelPreloadAdvisor`] looks at the active channel's circular
//! neighbours and keeps a matching set of resource hints alive in a
//! [`HintSink`]:
//! - constrained devices: the next channel only, manifest fetch for HLS
//! - unconstrained devices: both neighbours, fetch for HLS manifests and
//!   video preload for MP4
//!
//! Hints that no longer match are removed; all of them go on teardown.

mod device;

pub use device::{DeviceClass, DeviceProfile};

use crate::media::Playlist;
use crate::navigation::{next_channel, prev_channel};
use crate::stream::StreamFormat;
use crate::utils::config::PreloadConfig;
use log::debug;
use std::collections::BTreeMap;

/// Kind of resource hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintKind {
    /// Fetch the manifest ahead of time
    Fetch,
    /// Preload the start of a progressive video
    VideoPreload,
}

/// Prefetch directive for one URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHint {
    pub url: String,
    pub kind: HintKind,
}

/// Handle returned by a sink for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HintHandle(pub u64);

/// Network layer that accepts resource hints
pub trait HintSink {
    fn insert(&mut self, hint: &ResourceHint) -> HintHandle;
    fn remove(&mut self, handle: HintHandle);
}

/// In-memory sink, useful for inspection and the CLI
#[derive(Debug, Default)]
pub struct HintRegistry {
    next_handle: u64,
    hints: BTreeMap<HintHandle, ResourceHint>,
}

impl HintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hints currently installed, in insertion order
    pub fn hints(&self) -> impl Iterator<Item = &ResourceHint> {
        self.hints.values()
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }
}

impl HintSink for HintRegistry {
    fn insert(&mut self, hint: &ResourceHint) -> HintHandle {
        self.next_handle += 1;
        let handle = HintHandle(self.next_handle);
        self.hints.insert(handle, hint.clone());
        handle
    }

    fn remove(&mut self, handle: HintHandle) {
        self.hints.remove(&handle);
    }
}

/// Keeps prefetch hints in sync with the active channel
pub struct ChannelPreloadAdvisor<S: HintSink> {
    sink: S,
    class: DeviceClass,
    enabled: bool,
    installed: Vec<(ResourceHint, HintHandle)>,
}

impl<S: HintSink> ChannelPreloadAdvisor<S> {
    pub fn new(sink: S, class: DeviceClass) -> Self {
        Self {
            sink,
            class,
            enabled: true,
            installed: Vec::new(),
        }
    }

    /// Advisor configured from settings, detecting the device when no
    /// class override is set
    pub fn from_config(sink: S, config: &PreloadConfig) -> Self {
        let class = config
            .device_class
            .unwrap_or_else(|| DeviceProfile::detect().classify());
        let mut advisor = Self::new(sink, class);
        advisor.enabled = config.enabled;
        advisor
    }

    pub fn device_class(&self) -> DeviceClass {
        self.class
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Hints currently installed by this advisor
    pub fn active_hints(&self) -> impl Iterator<Item = &ResourceHint> {
        self.installed.iter().map(|(hint, _)| hint)
    }

    /// Hints wanted for `current_id` within `playlist`
    pub fn plan(&self, playlist: &Playlist, current_id: &str) -> Vec<ResourceHint> {
        if !self.enabled {
            return Vec::new();
        }

        let next = next_channel(playlist, current_id);
        let neighbours = match self.class {
            DeviceClass::Constrained => vec![next],
            DeviceClass::Unconstrained => vec![prev_channel(playlist, current_id), next],
        };

        let mut hints: Vec<ResourceHint> = Vec::new();
        for channel in neighbours.into_iter().flatten() {
            if channel.id == current_id {
                continue;
            }
            let kind = match (StreamFormat::from_url(&channel.url), self.class) {
                (StreamFormat::Hls, _) => HintKind::Fetch,
                (StreamFormat::Mp4, DeviceClass::Unconstrained) => HintKind::VideoPreload,
                _ => continue,
            };
            let hint = ResourceHint { url: channel.url.clone(), kind };
            if !hints.contains(&hint) {
                hints.push(hint);
            }
        }
        hints
    }

    /// Sync installed hints with the neighbours of `current_id`
    ///
    /// Calling again with the same inputs leaves the sink untouched.
    pub fn update(&mut self, playlist: &Playlist, current_id: &str) {
        let wanted = self.plan(playlist, current_id);

        let (keep, stale): (Vec<_>, Vec<_>) = std::mem::take(&mut self.installed)
            .into_iter()
            .partition(|(hint, _)| wanted.contains(hint));
        for (hint, handle) in stale {
            debug!("Removing {:?} hint for {}", hint.kind, hint.url);
            self.sink.remove(handle);
        }
        self.installed = keep;

        for hint in wanted {
            if self.installed.iter().any(|(h, _)| *h == hint) {
                continue;
            }
            debug!("Adding {:?} hint for {}", hint.kind, hint.url);
            let handle = self.sink.insert(&hint);
            self.installed.push((hint, handle));
        }
    }

    /// Remove every installed hint
    pub fn teardown(&mut self) {
        for (_, handle) in self.installed.drain(..) {
            self.sink.remove(handle);
        }
    }
}

impl<S: HintSink> Drop for ChannelPreloadAdvisor<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
