use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};
use std::path::{Path, PathBuf};

use iptvplayer::media::{parse_m3u, Playlist, RawSeries, Series};
use iptvplayer::navigation::{adjacent_episodes, next_channel, prev_channel};
use iptvplayer::preload::{ChannelPreloadAdvisor, DeviceClass, HintRegistry};
use iptvplayer::services::{save_playlist_with_notice, JsonFilePlaylistStore, Notice, PlaylistStore};
use iptvplayer::stream::{StreamFormat, StreamFormatResolver};
use iptvplayer::utils::{load_config, Config};

/// IPTV player core - channel navigation and stream tooling
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Use this config file instead of the system/user ones
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the channel after CHANNEL_ID (wraps around)
    Next {
        /// M3U playlist, or the stored playlist when omitted
        #[arg(short, long, value_name = "FILE")]
        playlist: Option<PathBuf>,
        channel_id: String,
    },

    /// Print the channel before CHANNEL_ID (wraps around)
    Prev {
        #[arg(short, long, value_name = "FILE")]
        playlist: Option<PathBuf>,
        channel_id: String,
    },

    /// Print the episodes around EPISODE_ID in a series JSON document
    Episodes {
        #[arg(value_name = "SERIES_JSON")]
        series: PathBuf,
        episode_id: String,
    },

    /// Show the detected format and alternate URL for a stream
    Fallback { url: String },

    /// Import an M3U playlist into local storage
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Playlist name, defaults to the file stem
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List the prefetch hints for CHANNEL_ID's neighbours
    Preload {
        #[arg(short, long, value_name = "FILE")]
        playlist: Option<PathBuf>,
        channel_id: String,

        /// Override the configured/detected device class
        #[arg(long, value_name = "CLASS")]
        device_class: Option<DeviceClass>,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => load_config()?,
    };

    let log_level = if args.debug { "debug" } else { config.general.log_level.as_str() };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting iptvplayer v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Next { playlist, channel_id } => {
            let playlist = open_playlist(&config, playlist.as_deref())?;
            match next_channel(&playlist, &channel_id) {
                Some(channel) => println!("{}\t{}\t{}", channel.id, channel.name, channel.url),
                None => bail!("channel '{}' not in playlist '{}'", channel_id, playlist.name()),
            }
        }
        Command::Prev { playlist, channel_id } => {
            let playlist = open_playlist(&config, playlist.as_deref())?;
            match prev_channel(&playlist, &channel_id) {
                Some(channel) => println!("{}\t{}\t{}", channel.id, channel.name, channel.url),
                None => bail!("channel '{}' not in playlist '{}'", channel_id, playlist.name()),
            }
        }
        Command::Episodes { series, episode_id } => {
            let series = read_series(&series)?;
            if series.episode(&episode_id).is_none() {
                bail!("episode '{}' not in series '{}'", episode_id, series.name);
            }
            let adjacent = adjacent_episodes(&series, &episode_id);
            let show = |label: &str, episode: Option<&iptvplayer::media::Episode>| match episode {
                Some(e) => println!(
                    "{}\tS{:02}E{:02}\t{}\t{}",
                    label, e.season_number, e.episode_number, e.id, e.name
                ),
                None => println!("{}\t-", label),
            };
            show("prev", adjacent.prev);
            show("next", adjacent.next);
        }
        Command::Fallback { url } => {
            let resolver = StreamFormatResolver::new();
            let format = StreamFormat::from_url(&url);
            println!("format\t{:?}", format);
            match resolver.fallback(&url) {
                Some(alternate) => println!("fallback\t{}", alternate),
                None => println!("fallback\t-"),
            }
        }
        Command::Import { file, name } => {
            let name = name.unwrap_or_else(|| {
                file.file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "playlist".to_string())
            });
            let playlist = read_m3u(&file, &name)?;
            let mut store = JsonFilePlaylistStore::in_dir(&config.data_dir());
            let notice = save_playlist_with_notice(&mut store, &playlist).unwrap_or_else(|| {
                Notice::info(format!(
                    "Imported {} channels into {:?}",
                    playlist.len(),
                    store.path()
                ))
            });
            println!("{}", notice);
        }
        Command::Preload { playlist, channel_id, device_class } => {
            let playlist = open_playlist(&config, playlist.as_deref())?;
            if playlist.position(&channel_id).is_none() {
                bail!("channel '{}' not in playlist '{}'", channel_id, playlist.name());
            }
            let mut preload = config.preload.clone();
            if device_class.is_some() {
                preload.device_class = device_class;
            }
            let mut advisor = ChannelPreloadAdvisor::from_config(HintRegistry::new(), &preload);
            advisor.update(&playlist, &channel_id);
            println!("device\t{}", advisor.device_class());
            for hint in advisor.active_hints() {
                println!("{:?}\t{}", hint.kind, hint.url);
            }
        }
        Command::Config => {
            let text = toml::to_string_pretty(&config).context("Failed to render config")?;
            print!("{}", text);
        }
    }

    Ok(())
}

/// Playlist from an M3U file, or the stored one
fn open_playlist(config: &Config, path: Option<&Path>) -> Result<Playlist> {
    if let Some(path) = path {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        return read_m3u(path, &name);
    }

    let store = JsonFilePlaylistStore::in_dir(&config.data_dir());
    match store.get_playlist()? {
        Some(playlist) => Ok(playlist),
        None => {
            warn!("No stored playlist at {:?}", store.path());
            bail!("no playlist given and none stored; run `iptvplayer import <FILE>` first")
        }
    }
}

fn read_m3u(path: &Path, name: &str) -> Result<Playlist> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read playlist {:?}", path))?;
    Ok(parse_m3u(name, &content)?)
}

fn read_series(path: &Path) -> Result<Series> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read series {:?}", path))?;
    let raw: RawSeries = serde_json::from_str(&content).context("Invalid series document")?;
    Ok(Series::try_from(raw)?)
}
