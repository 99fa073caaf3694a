//! M3U playlist import

use crate::media::{Channel, Playlist};
use crate::utils::error::{IptvError, Result};
use std::collections::{HashMap, HashSet};

/// Parse M3U text into a [`Playlist`]
///
/// Channel ids come from `tvg-id` when present and not already taken,
/// otherwise `ch-<n>` with `n` the 1-based position in the file. A
/// generated id that collides with an earlier one gets a `-<k>` suffix.
pub fn parse_m3u(name: &str, content: &str) -> Result<Playlist> {
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());

    match lines.next() {
        Some(header) if header.starts_with("#EXTM3U") => {}
        _ => return Err(IptvError::UnsupportedFormat("missing #EXTM3U header".to_string())),
    }

    let mut channels = Vec::new();
    let mut taken = HashSet::new();
    let mut pending: Option<(String, HashMap<String, String>)> = None;

    for line in lines {
        if let Some(info) = line.strip_prefix("#EXTINF:") {
            let (head, title) = split_extinf(info);
            let mut attrs = HashMap::new();
            extract_attrs(head, &mut attrs);
            pending = Some((title.trim().to_string(), attrs));
        } else if !line.starts_with('#') {
            let Some((title, attrs)) = pending.take() else {
                log::debug!("Skipping URL without #EXTINF: {}", line);
                continue;
            };

            let id = match attrs.get("tvg-id") {
                Some(tvg) if !tvg.is_empty() && !taken.contains(tvg) => tvg.clone(),
                _ => generated_id(channels.len() + 1, &taken),
            };
            taken.insert(id.clone());

            let name = if title.is_empty() {
                attrs.get("tvg-name").cloned().unwrap_or_else(|| id.clone())
            } else {
                title
            };

            channels.push(Channel {
                id,
                name,
                url: line.to_string(),
                logo_url: attrs.get("tvg-logo").cloned(),
                epg_id: attrs.get("tvg-id").cloned().filter(|s| !s.is_empty()),
                group: attrs.get("group-title").cloned(),
            });
        }
    }

    log::info!("Imported {} channels from M3U '{}'", channels.len(), name);
    Playlist::new(name, channels)
}

fn generated_id(ordinal: usize, taken: &HashSet<String>) -> String {
    let base = format!("ch-{}", ordinal);
    if !taken.contains(&base) {
        return base;
    }
    (2..)
        .map(|k| format!("{}-{}", base, k))
        .find(|id| !taken.contains(id))
        .unwrap_or(base)
}

/// Split an EXTINF body into attribute block and title
///
/// The title starts after the first comma outside a quoted value, so
/// commas inside the title are kept.
fn split_extinf(info: &str) -> (&str, &str) {
    let mut quoted = false;
    for (pos, c) in info.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => return (&info[..pos], &info[pos + 1..]),
            _ => {}
        }
    }
    (info, "")
}

/// Extract `key="value"` / `key=value` attributes from an EXTINF head
fn extract_attrs(head: &str, attrs: &mut HashMap<String, String>) {
    let mut rest = head;
    while let Some(eq) = rest.find('=') {
        let key = rest[..eq].rsplit(' ').next().unwrap_or("").trim().to_lowercase();
        let after = &rest[eq + 1..];

        let (value, remaining) = if let Some(quoted) = after.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            }
        } else {
            match after.find(' ') {
                Some(end) => (&after[..end], &after[end..]),
                None => (after, ""),
            }
        };

        if !key.is_empty() {
            attrs.insert(key, value.to_string());
        }
        rest = remaining;
    }
}
