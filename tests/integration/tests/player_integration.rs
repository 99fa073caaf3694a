//! Integration tests for the playback engine
//!
//! These tests drive the engine through a scripted backend and verify:
//! - Backend selection and session bookkeeping
//! - Recovery and format fallback
//! - Terminal error reporting
//! - Resource cleanup on every exit path

use anyhow::Result;
use iptvplayer::media::{Channel, PlayableItem};
use iptvplayer::player::{
    BackendEvent, BackendKind, DecoderError, ErrorDetails, ErrorType, EventTopic, PlaybackEngine,
    PlaybackState, PlayerEvent,
};
use iptvplayer::utils::PlayerConfig;
use iptvplayer_integration_tests::{EventLog, Journal, ScriptedFactory};

fn item(url: &str) -> PlayableItem {
    Channel::new("stream", "Stream", url).into()
}

fn engine(config: PlayerConfig) -> (PlaybackEngine, Journal, EventLog) {
    let (factory, journal) = ScriptedFactory::new();
    let mut engine = PlaybackEngine::new(Box::new(factory), config);
    let log = EventLog::default();
    engine.add_event_handler(log.handler());
    (engine, journal, log)
}

fn current_session(engine: &PlaybackEngine) -> iptvplayer::player::SessionId {
    engine.session().expect("active session").id
}

#[test]
fn test_mp4_falls_back_to_hls_then_gives_up() -> Result<()> {
    let (mut engine, journal, log) = engine(PlayerConfig::default());

    let first = engine.load(&item("http://x/stream.mp4"))?;
    assert_eq!(engine.state(), PlaybackState::Loading);
    engine.handle_event(first, BackendEvent::NativeFailure("unsupported codec".to_string()));

    // One retry with the alternate format on the adaptive decoder
    let second = current_session(&engine);
    assert_ne!(first, second);
    assert_eq!(engine.state(), PlaybackState::Loading);
    assert!(engine.session().unwrap().fallback_used());
    journal.with(|j| {
        assert_eq!(j.created, vec![BackendKind::Native, BackendKind::Adaptive]);
        assert_eq!(j.loaded_urls, vec!["http://x/stream.mp4", "http://x/stream.m3u8"]);
        assert_eq!(j.live_backends(), 1);
    });

    engine.handle_event(
        second,
        BackendEvent::Decoder(DecoderError::fatal(
            ErrorType::Other,
            ErrorDetails::Other("manifestParsingError".to_string()),
        )),
    );

    assert_eq!(engine.state(), PlaybackState::Error);
    assert_eq!(log.errors(), vec!["unrecoverable stream error".to_string()]);
    journal.with(|j| {
        assert_eq!(j.created.len(), 2);
        assert_eq!(j.live_backends(), 0);
        assert_eq!(j.open_subscriptions, 0);
    });
    Ok(())
}

#[test]
fn test_native_failure_without_alternate_reports_format() -> Result<()> {
    let (mut engine, journal, log) = engine(PlayerConfig::default());

    let id = engine.load(&item("http://x/radio.aac"))?;
    engine.handle_event(id, BackendEvent::NativeFailure("no decoder".to_string()));

    assert_eq!(engine.state(), PlaybackState::Error);
    assert_eq!(log.errors(), vec!["format unsupported".to_string()]);
    journal.with(|j| assert_eq!(j.live_backends(), 0));
    Ok(())
}

#[test]
fn test_network_retries_are_bounded_per_stage() -> Result<()> {
    let (mut engine, journal, log) = engine(PlayerConfig::default());

    let id = engine.load(&item("http://x/live.m3u8?token=abc"))?;
    engine.handle_event(id, BackendEvent::Ready);
    assert_eq!(engine.state(), PlaybackState::Playing);

    let manifest_error = DecoderError::fatal(ErrorType::Network, ErrorDetails::ManifestLoad);
    for _ in 0..5 {
        engine.handle_event(id, BackendEvent::Decoder(manifest_error.clone()));
    }
    journal.with(|j| {
        assert_eq!(j.start_load_calls, 5);
        assert_eq!(j.created.len(), 1);
    });

    // Budget exhausted: switch format, keeping the query string
    engine.handle_event(id, BackendEvent::Decoder(manifest_error));
    journal.with(|j| {
        assert_eq!(j.created, vec![BackendKind::Adaptive, BackendKind::Native]);
        assert_eq!(j.loaded_urls.last().map(String::as_str), Some("http://x/live.mp4?token=abc"));
    });
    assert!(log.errors().is_empty());

    // The replacement resumes playback once ready
    let replacement = current_session(&engine);
    engine.handle_event(replacement, BackendEvent::Ready);
    assert_eq!(engine.state(), PlaybackState::Playing);
    Ok(())
}

#[test]
fn test_fallback_does_not_start_unplayed_stream() -> Result<()> {
    let config = PlayerConfig {
        auto_play: false,
        ..PlayerConfig::default()
    };
    let (mut engine, _journal, log) = engine(config);

    let id = engine.load(&item("http://x/show.m3u8"))?;
    engine.handle_event(id, BackendEvent::Ready);
    assert_eq!(engine.state(), PlaybackState::Ready);

    let media = DecoderError::fatal(ErrorType::Media, ErrorDetails::BufferStalled);
    engine.handle_event(id, BackendEvent::Decoder(media.clone()));
    engine.handle_event(id, BackendEvent::Decoder(media));

    // Never started, so the fallback does not start playing either
    let replacement = current_session(&engine);
    engine.handle_event(replacement, BackendEvent::Ready);
    assert_eq!(engine.state(), PlaybackState::Ready);
    assert!(!log.events().contains(&PlayerEvent::Play));
    Ok(())
}

#[test]
fn test_stale_session_events_are_ignored() -> Result<()> {
    let (mut engine, _journal, log) = engine(PlayerConfig::default());

    let old = engine.load(&item("http://x/a.m3u8"))?;
    let new = engine.load(&item("http://x/b.m3u8"))?;
    assert_ne!(old, new);

    engine.handle_event(old, BackendEvent::Ready);
    engine.handle_event(old, BackendEvent::Decoder(DecoderError::fatal(
        ErrorType::Other,
        ErrorDetails::Other("late".to_string()),
    )));
    assert_eq!(engine.state(), PlaybackState::Loading);
    assert!(log.events().is_empty());

    engine.handle_event(new, BackendEvent::Ready);
    assert_eq!(log.events(), vec![PlayerEvent::Ready, PlayerEvent::Play]);
    Ok(())
}

#[test]
fn test_one_live_backend_across_loads() -> Result<()> {
    let (mut engine, journal, _log) = engine(PlayerConfig::default());

    for url in ["http://x/1.m3u8", "http://x/2.mp4", "http://x/3.m3u8"] {
        engine.load(&item(url))?;
        journal.with(|j| {
            assert_eq!(j.live_backends(), 1);
            assert_eq!(j.open_subscriptions, EventTopic::ALL.len());
        });
    }

    engine.dispose();
    assert_eq!(engine.state(), PlaybackState::Idle);
    assert!(!engine.has_live_backend());
    journal.with(|j| {
        assert_eq!(j.live_backends(), 0);
        assert_eq!(j.open_subscriptions, 0);
    });
    Ok(())
}

#[test]
fn test_drop_releases_backend() -> Result<()> {
    let (mut engine, journal, _log) = engine(PlayerConfig::default());
    engine.load(&item("http://x/1.m3u8"))?;
    drop(engine);
    journal.with(|j| {
        assert_eq!(j.destroyed, 1);
        assert_eq!(j.open_subscriptions, 0);
    });
    Ok(())
}

#[test]
fn test_hls_without_adaptive_decoder_plays_natively() -> Result<()> {
    let (factory, journal) = ScriptedFactory::new();
    let mut engine = PlaybackEngine::new(Box::new(factory.without_adaptive(true)), PlayerConfig::default());

    engine.load(&item("http://x/live.m3u8"))?;
    assert_eq!(engine.session().unwrap().backend_kind, BackendKind::Native);
    journal.with(|j| assert_eq!(j.created, vec![BackendKind::Native]));
    Ok(())
}

#[test]
fn test_commands_follow_playable_states() -> Result<()> {
    let (mut engine, journal, _log) = engine(PlayerConfig {
        auto_play: false,
        ..PlayerConfig::default()
    });

    let id = engine.load(&item("http://x/vod.mp4"))?;
    engine.play()?;
    engine.set_volume(0.2);
    assert_eq!(engine.state(), PlaybackState::Loading);
    assert_eq!(engine.session().unwrap().volume, 1.0);

    engine.handle_event(id, BackendEvent::Ready);
    engine.play()?;
    engine.play()?;
    engine.set_volume(1.7);
    engine.set_muted(true);
    assert_eq!(engine.state(), PlaybackState::Playing);
    let session = engine.session().unwrap();
    assert_eq!(session.volume, 1.0);
    assert!(session.is_muted);
    journal.with(|j| assert_eq!(j.play_calls, 1));

    engine.toggle_play()?;
    assert_eq!(engine.state(), PlaybackState::Paused);
    engine.handle_event(id, BackendEvent::Ended);
    assert_eq!(engine.state(), PlaybackState::Ended);
    Ok(())
}
