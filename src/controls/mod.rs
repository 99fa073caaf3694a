//! Auto-hiding on-screen controls
//!
//! Controls become visible on any interaction and hide again once the
//! configured delay passes without further input. Time is supplied by the
//! caller, so the UI loop decides when deadlines are checked.
//!
//! Hiding is suppressed while an overlay (info panel, dialog) is open or
//! while playback is paused.

use crate::utils::config::ControlsConfig;
use crate::utils::preferences::Preferences;
use log::debug;
use std::time::{Duration, Instant};

/// Visibility state machine for player controls
#[derive(Debug, Clone)]
pub struct AutoHideController {
    delay: Duration,
    visible: bool,
    hide_at: Option<Instant>,
    overlay_open: bool,
    paused: bool,
    mounted: bool,
}

impl AutoHideController {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            visible: true,
            hide_at: None,
            overlay_open: false,
            paused: false,
            mounted: true,
        }
    }

    pub fn from_config(config: &ControlsConfig) -> Self {
        Self::new(Duration::from_millis(config.hide_delay_ms))
    }

    /// Controller using the delay from user preferences
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self::new(prefs.hide_delay())
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Pending hide deadline, if the timer is armed
    pub fn hide_deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    /// Change the hide delay; an armed timer keeps its current deadline
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Mouse move, key press, tap: show and push the deadline forward
    pub fn notify_interaction(&mut self, now: Instant) {
        if !self.mounted {
            return;
        }
        self.visible = true;
        self.arm(now);
    }

    /// Show without arming the timer
    pub fn force_show(&mut self) {
        self.visible = true;
        self.hide_at = None;
    }

    /// Hide immediately and cancel the timer
    pub fn force_hide(&mut self) {
        self.visible = false;
        self.hide_at = None;
    }

    /// Overlay opened or closed; closing re-arms the timer
    pub fn set_overlay_open(&mut self, open: bool, now: Instant) {
        if self.overlay_open == open {
            return;
        }
        self.overlay_open = open;
        if open {
            self.hide_at = None;
        } else if self.visible {
            self.arm(now);
        }
    }

    /// Playback paused or resumed; controls stay up while paused
    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        if self.paused == paused {
            return;
        }
        self.paused = paused;
        if paused {
            self.visible = true;
            self.hide_at = None;
        } else {
            self.arm(now);
        }
    }

    /// Fire the timer if its deadline has passed; returns true on hide
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(deadline) if now >= deadline => {
                self.hide_at = None;
                self.visible = false;
                debug!("Controls hidden");
                true
            }
            _ => false,
        }
    }

    /// Cancel the timer for good; later interactions are ignored
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.hide_at = None;
    }

    fn arm(&mut self, now: Instant) {
        if !self.mounted || self.overlay_open || self.paused {
            self.hide_at = None;
            return;
        }
        self.hide_at = Some(now + self.delay);
    }
}

impl Default for AutoHideController {
    fn default() -> Self {
        Self::from_preferences(&Preferences::default())
    }
}
