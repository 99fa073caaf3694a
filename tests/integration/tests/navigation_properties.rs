//! Property tests for navigation and format fallback

use iptvplayer::media::{Channel, Episode, Playlist, Season, Series};
use iptvplayer::navigation::{adjacent_episodes, next_channel, prev_channel};
use iptvplayer::stream::StreamFormatResolver;
use proptest::prelude::*;

fn playlist(len: usize) -> Playlist {
    let channels = (0..len)
        .map(|i| Channel::new(format!("c{}", i), format!("C{}", i), format!("http://x/{}.m3u8", i)))
        .collect();
    Playlist::new("prop", channels).unwrap()
}

/// Series from per-season episode counts; numbers are unique and shuffled
/// by reversing the input order
fn series(counts: &[usize]) -> Series {
    let seasons = counts
        .iter()
        .enumerate()
        .rev()
        .map(|(s, &count)| {
            let season_number = s as u32 + 1;
            Season {
                season_number,
                episodes: (1..=count as u32)
                    .rev()
                    .map(|e| Episode {
                        id: format!("s{}e{}", season_number, e),
                        name: String::new(),
                        url: format!("http://x/s{}e{}.mp4", season_number, e),
                        logo_url: None,
                        season_number,
                        episode_number: e,
                    })
                    .collect(),
            }
        })
        .collect();
    Series::new("prop", "Prop", seasons)
}

proptest! {
    #[test]
    fn prop_prev_then_next_is_identity(len in 1usize..50, pick in any::<prop::sample::Index>()) {
        let playlist = playlist(len);
        let current = &playlist.channels()[pick.index(len)];

        let prev = prev_channel(&playlist, &current.id).unwrap();
        prop_assert_eq!(&next_channel(&playlist, &prev.id).unwrap().id, &current.id);

        let next = next_channel(&playlist, &current.id).unwrap();
        prop_assert_eq!(&prev_channel(&playlist, &next.id).unwrap().id, &current.id);

        if len == 1 {
            prop_assert_eq!(&next.id, &current.id);
        }
    }

    #[test]
    fn prop_walking_next_visits_every_episode(counts in prop::collection::vec(0usize..6, 1..6)) {
        let series = series(&counts);
        let total = series.episode_count();
        prop_assume!(total > 0);

        let first = series.episodes().next().unwrap().id.clone();
        let last = series.episodes().last().unwrap().id.clone();

        let mut current = first;
        for _ in 0..total - 1 {
            current = adjacent_episodes(&series, &current).next.unwrap().id.clone();
        }
        prop_assert_eq!(&current, &last);
        prop_assert!(adjacent_episodes(&series, &current).next.is_none());
    }

    #[test]
    fn prop_fallback_round_trips(
        stem in "[a-z0-9/]{1,20}",
        ext in prop::sample::select(vec![".mp4", ".m3u8", ".MP4", ".M3U8"]),
        query in prop::option::of("[a-z0-9=&]{1,10}"),
    ) {
        let resolver = StreamFormatResolver::new();
        let url = match &query {
            Some(q) => format!("http://cdn/{}{}?{}", stem, ext, q),
            None => format!("http://cdn/{}{}", stem, ext),
        };

        let alternate = resolver.fallback(&url).unwrap();
        let back = resolver.fallback(&alternate).unwrap();
        prop_assert_eq!(back.to_ascii_lowercase(), url.to_ascii_lowercase());
        if let Some(q) = &query {
            let expected_query = format!("?{}", q);
            prop_assert!(alternate.ends_with(&expected_query));
        }
    }

    #[test]
    fn prop_other_suffixes_have_no_fallback(stem in "[a-z0-9]{1,12}", ext in "\\.(ts|aac|mkv|m3u|mp3)") {
        let resolver = StreamFormatResolver::new();
        let url = format!("http://cdn/{}{}", stem, ext);
        prop_assert!(resolver.fallback(&url).is_none());
    }
}
