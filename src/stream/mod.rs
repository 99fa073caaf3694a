//! Stream format resolution
//!
//! Decides how a media URL is played and which alternate URL to try when
//! the current one fails. Extension matching looks at the URL path only:
//! query string and fragment are ignored and preserved, and the match is
//! ASCII case-insensitive.

use serde::{Deserialize, Serialize};

const HLS_EXT: &str = ".m3u8";
const MP4_EXT: &str = ".mp4";

/// Container/transport format inferred from a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamFormat {
    /// HLS manifest, played by the adaptive-stream decoder
    Hls,
    /// Progressive MP4, played natively
    Mp4,
    /// Anything else, played natively without a fallback
    Other,
}

impl StreamFormat {
    /// Infer the format from a URL suffix
    pub fn from_url(url: &str) -> Self {
        let path = split_suffix(url).0.to_ascii_lowercase();
        if path.ends_with(HLS_EXT) {
            StreamFormat::Hls
        } else if path.ends_with(MP4_EXT) {
            StreamFormat::Mp4
        } else {
            StreamFormat::Other
        }
    }

    /// Whether this format needs the adaptive-stream decoder
    pub fn is_adaptive(self) -> bool {
        self == StreamFormat::Hls
    }
}

/// Stateless URL resolver
///
/// Only a single hop is defined: `.mp4` ⇄ `.m3u8`. Callers own the
/// bookkeeping that keeps a failing pair from alternating forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamFormatResolver;

impl StreamFormatResolver {
    pub fn new() -> Self {
        Self
    }

    /// Initial URL for an item (identity)
    pub fn resolve(&self, url: &str) -> String {
        url.to_string()
    }

    /// Alternate-format URL for a failing one, if any
    pub fn fallback(&self, current_url: &str) -> Option<String> {
        let (path, tail) = split_suffix(current_url);
        let (current, replacement) = match StreamFormat::from_url(current_url) {
            StreamFormat::Mp4 => (MP4_EXT, HLS_EXT),
            StreamFormat::Hls => (HLS_EXT, MP4_EXT),
            StreamFormat::Other => return None,
        };

        let stem = &path[..path.len() - current.len()];
        Some(format!("{}{}{}", stem, replacement, tail))
    }
}

/// Split a URL into (path part, `?query#fragment` tail)
fn split_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}
