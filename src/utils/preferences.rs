//! Observable user preferences
//!
//! Theme and control preferences live in an explicit store handed to the
//! components that need them. Changes are pushed to subscribers; dropping
//! the returned [`PreferenceSubscription`] unsubscribes.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
}

/// User preferences consumed by the playback layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Color scheme
    pub theme: ThemeMode,

    /// Accent color (hex)
    pub accent_color: String,

    /// Controls hide delay in milliseconds
    pub controls_hide_delay_ms: u64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Dark,
            accent_color: "#E50914".to_string(),
            controls_hide_delay_ms: 3000,
        }
    }
}

impl Preferences {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }
}

type Listener = Arc<dyn Fn(&Preferences) + Send + Sync>;

struct Inner {
    current: Preferences,
    listeners: BTreeMap<u64, Listener>,
    next_id: u64,
}

/// Shared, observable preference store
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Arc<RwLock<Inner>>,
}

impl PreferenceStore {
    pub fn new(initial: Preferences) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                current: initial,
                listeners: BTreeMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Snapshot of the current preferences
    pub fn get(&self) -> Preferences {
        self.inner.read().current.clone()
    }

    /// Mutate preferences and notify subscribers if anything changed
    pub fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut Preferences),
    {
        let (snapshot, listeners) = {
            let mut inner = self.inner.write();
            let before = inner.current.clone();
            updater(&mut inner.current);
            if inner.current == before {
                return;
            }
            let listeners: Vec<Listener> = inner.listeners.values().cloned().collect();
            (inner.current.clone(), listeners)
        };

        log::debug!("Preferences changed: {:?}", snapshot);
        // Lock released: listeners may update, subscribe or unsubscribe
        for listener in listeners {
            listener(&snapshot);
        }
    }

    /// Register a change listener
    ///
    /// Listeners run after the store lock is released.
    pub fn subscribe<F>(&self, listener: F) -> PreferenceSubscription
    where
        F: Fn(&Preferences) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Arc::new(listener));

        PreferenceSubscription {
            id,
            store: Arc::clone(&self.inner),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.read().listeners.len()
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

/// Subscription handle; unsubscribes on drop
pub struct PreferenceSubscription {
    id: u64,
    store: Arc<RwLock<Inner>>,
}

impl Drop for PreferenceSubscription {
    fn drop(&mut self) {
        self.store.write().listeners.remove(&self.id);
    }
}
