//! Integration tests for watch history, playlist storage and the guide
//!
//! External collaborators are mocked with mockall.

use anyhow::Result;
use async_trait::async_trait;
use iptvplayer::controls::AutoHideController;
use iptvplayer::media::{parse_m3u, Channel, ItemKind, PlayableItem, Playlist, RawSeries, Series};
use iptvplayer::navigation::{ChannelNavigator, Direction, EpisodeNavigator};
use iptvplayer::preload::{ChannelPreloadAdvisor, DeviceClass, HintHandle, HintKind, HintSink, ResourceHint};
use iptvplayer::services::{
    load_guide, save_playlist_with_notice, EpgService, JsonFilePlaylistStore, NoticeLevel,
    PlaylistStore, ProgramEntry,
};
use iptvplayer::utils::{PreferenceStore, Preferences, WatchConfig};
use iptvplayer::watch::{WatchHistory, WatchSample, WatchTimeTracker};
use iptvplayer::IptvError;
use iptvplayer_integration_tests::{abc_playlist, TestFixture};
use mockall::predicate::*;
use mockall::{mock, Sequence};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

mock! {
    pub History {}

    impl WatchHistory for History {
        fn record(&mut self, sample: &WatchSample) -> iptvplayer::Result<()>;
    }
}

mock! {
    pub Store {}

    impl PlaylistStore for Store {
        fn get_playlist(&self) -> iptvplayer::Result<Option<Playlist>>;
        fn save_playlist(&mut self, playlist: &Playlist) -> iptvplayer::Result<()>;
    }
}

mock! {
    pub Guide {}

    #[async_trait]
    impl EpgService for Guide {
        async fn fetch_programs(&self, channel: &Channel) -> iptvplayer::Result<Option<Vec<ProgramEntry>>>;
    }
}

mock! {
    pub Sink {}

    impl HintSink for Sink {
        fn insert(&mut self, hint: &ResourceHint) -> HintHandle;
        fn remove(&mut self, handle: HintHandle);
    }
}

#[test]
fn test_watch_samples_reach_history() {
    let mut history = MockHistory::new();
    let mut seq = Sequence::new();
    history
        .expect_record()
        .withf(|s| s.item_id == "a" && s.kind == ItemKind::Channel && s.elapsed_secs == 30)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    history
        .expect_record()
        .withf(|s| s.item_id == "a" && s.elapsed_secs == 12)
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(IptvError::Storage("offline".to_string())));

    let t0 = Instant::now();
    let item: PlayableItem = abc_playlist().channels()[0].clone().into();
    let mut tracker = WatchTimeTracker::new(history, &WatchConfig::default());
    tracker.activate(&item, t0);
    tracker.on_play(t0);
    assert!(tracker.tick(t0 + Duration::from_secs(30)));
    tracker.on_pause(t0 + Duration::from_secs(42));
    // Below the minimum: nothing recorded
    tracker.on_play(t0 + Duration::from_secs(50));
    tracker.unmount(t0 + Duration::from_secs(53));
}

#[test]
fn test_store_failure_is_a_notice() {
    let mut store = MockStore::new();
    store
        .expect_save_playlist()
        .times(1)
        .returning(|_| Err(IptvError::QuotaExceeded { needed: 9000, limit: 5000 }));

    let notice = save_playlist_with_notice(&mut store, &abc_playlist()).unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
}

#[test]
fn test_m3u_import_round_trips_through_store() -> Result<()> {
    let fixture = TestFixture::new()?;
    let content = std::fs::read_to_string(&fixture.playlist_m3u)?;
    let playlist = parse_m3u("sample", &content)?;

    let ids: Vec<_> = playlist.channels().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["news", "movies", "ch-3"]);
    assert_eq!(playlist.channels()[0].group.as_deref(), Some("News"));

    let mut store = JsonFilePlaylistStore::in_dir(fixture.path());
    assert!(save_playlist_with_notice(&mut store, &playlist).is_none());
    let stored = store.get_playlist()?.expect("playlist was saved");
    assert_eq!(stored, playlist);

    let mut nav = ChannelNavigator::new(stored);
    assert_eq!(nav.step(Direction::Previous).map(|c| c.id.clone()), Some("ch-3".to_string()));
    Ok(())
}

#[test]
fn test_series_document_normalises_numbers() -> Result<()> {
    let fixture = TestFixture::new()?;
    let raw: RawSeries = serde_json::from_str(&std::fs::read_to_string(&fixture.series_json)?)?;
    let series = Series::try_from(raw)?;

    let order: Vec<_> = series.episodes().map(|e| e.id.as_str()).collect();
    assert_eq!(order, vec!["s1e2", "s1e10", "s2e1"]);

    let mut nav = EpisodeNavigator::new(series);
    assert_eq!(nav.step(Direction::Next).map(|e| e.id.clone()), Some("s1e10".to_string()));
    assert_eq!(nav.step(Direction::Next).map(|e| e.id.clone()), Some("s2e1".to_string()));
    assert!(nav.step(Direction::Next).is_none());
    Ok(())
}

#[tokio::test]
async fn test_guide_failure_does_not_propagate() {
    let mut guide = MockGuide::new();
    guide
        .expect_fetch_programs()
        .times(1)
        .returning(|_| Err(IptvError::Backend("503".to_string())));

    let channel = Channel::new("news", "News", "http://x/news.m3u8");
    assert!(load_guide(&guide, &channel).await.is_empty());
}

#[test]
fn test_preload_hints_are_removed_on_drop() {
    let mut sink = MockSink::new();
    sink.expect_insert()
        .with(eq(ResourceHint {
            url: "http://x/c.m3u8".to_string(),
            kind: HintKind::Fetch,
        }))
        .times(1)
        .returning(|_| HintHandle(7));
    sink.expect_remove().with(eq(HintHandle(7))).times(1).return_const(());

    let playlist = abc_playlist();
    let mut advisor = ChannelPreloadAdvisor::new(sink, DeviceClass::Constrained);
    advisor.update(&playlist, "b");
    advisor.update(&playlist, "b");
    drop(advisor);
}

#[test]
fn test_controls_follow_preferences_and_playback() {
    let prefs = Preferences {
        controls_hide_delay_ms: 5000,
        ..Preferences::default()
    };
    let t0 = Instant::now();
    let mut controls = AutoHideController::from_preferences(&prefs);
    controls.notify_interaction(t0);
    assert!(!controls.tick(t0 + Duration::from_millis(4999)));

    controls.set_paused(true, t0 + Duration::from_millis(4000));
    assert!(!controls.tick(t0 + Duration::from_secs(60)));
    assert!(controls.is_visible());

    controls.set_paused(false, t0 + Duration::from_secs(60));
    assert!(controls.tick(t0 + Duration::from_secs(65)));
    assert!(!controls.is_visible());
}

#[test]
fn test_preference_changes_reach_controls() {
    let store = PreferenceStore::default();
    let mut controls = AutoHideController::from_preferences(&store.get());
    assert_eq!(controls.delay(), Duration::from_millis(3000));

    let latest = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&latest);
    let subscription = store.subscribe(move |prefs| {
        *seen.lock().unwrap() = Some(prefs.hide_delay());
    });

    store.update(|p| p.controls_hide_delay_ms = 4500);
    if let Some(delay) = latest.lock().unwrap().take() {
        controls.set_delay(delay);
    }
    assert_eq!(controls.delay(), Duration::from_millis(4500));

    drop(subscription);
    assert_eq!(store.subscriber_count(), 0);
}
