//! IPTV player core
//!
//! Playback control and channel navigation for IPTV/VOD clients:
//! - [`stream`]: stream format detection and format fallback
//! - [`player`]: playback engine with bounded error recovery
//! - [`navigation`]: circular channel zapping and episode ordering
//! - [`controls`]: auto-hiding on-screen controls
//! - [`watch`]: watch-time accounting
//! - [`preload`]: neighbour prefetch hints
//! - [`services`]: playlist storage and program guide collaborators

pub mod controls;
pub mod media;
pub mod navigation;
pub mod player;
pub mod preload;
pub mod services;
pub mod stream;
pub mod utils;
pub mod watch;

pub use utils::error::{IptvError, Result};
