//! Property-based tests for the weekly aggregation invariant
//!
//! The playlist entry is the pipeline's idempotency boundary: however the
//! settlements of one (show, song, week) triple interleave, exactly one
//! aggregate row may exist and its counter must equal the number of play
//! records behind it. These properties drive the whole service against a
//! throwaway store per case, so the case counts stay deliberately small.

use chrono::{Datelike, Days, NaiveDate};
use proptest::prelude::*;
use radio_settlement::catalog::Song;
use radio_settlement::service::RadioService;
use radio_settlement::settlement::SettlementOptions;
use radio_settlement::store;
use radio_settlement::submission::SubmissionDraft;
use radio_settlement::time::{TimeStamp, WeekStart};
use std::sync::Arc;
use tempfile::tempdir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Property: N settlements of one triple fold into one aggregate row
    /// with times_played = N, backed by N play records, and the song's
    /// counters equal the sum of the play deltas
    #[test]
    fn prop_repeat_settlements_fold_into_one_row(
        spins in 1usize..=5,
        draws in prop::collection::vec(0.0f64..1.0, 5)
    ) {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(sled::open(temp_dir.path().join("aggregate.db")).unwrap());
        let service = RadioService::new(db.clone());

        let station = service.add_station("Radio One", 25_000).unwrap();
        let show = service.add_show(&station.id, "Morning Drive", 1).unwrap();
        let song = service.add_song("Static Bloom", None).unwrap();

        let now = TimeStamp::new_with(2024, 6, 5, 13, 0, 0);
        for draw in draws.iter().take(spins) {
            let submission = service
                .submit_song(
                    SubmissionDraft::new()
                        .for_song(&song.id)
                        .on_station(&station.id),
                )
                .unwrap();
            service
                .settle_submission_with(
                    &submission.id,
                    SettlementOptions::new().at(now.clone()).with_draw(*draw),
                )
                .unwrap();
        }

        let playlists = store::playlists_for_show(&db, &show.id).unwrap();
        prop_assert_eq!(playlists.len(), 1);
        prop_assert_eq!(playlists[0].times_played as usize, spins);

        let plays = store::plays_for_song(&db, &song.id).unwrap();
        prop_assert_eq!(plays.len(), spins);
        prop_assert!(plays.iter().all(|play| play.playlist_id == playlists[0].id));

        let stored: Song = store::get(&db, &song.id).unwrap().unwrap();
        prop_assert_eq!(stored.total_radio_plays as usize, spins);
        let streams: u64 = plays.iter().map(|play| u64::from(play.streams_boost)).sum();
        prop_assert_eq!(stored.streams, streams);
        let revenue: u64 = plays.iter().map(|play| u64::from(play.sales_boost)).sum();
        prop_assert_eq!(stored.revenue, revenue);
    }

    /// Property: settlements backdated to distinct weeks never share an
    /// aggregate row
    #[test]
    fn prop_distinct_weeks_do_not_collide(
        week_offsets in prop::collection::hash_set(0u64..8, 1..=4)
    ) {
        let temp_dir = tempdir().unwrap();
        let db = Arc::new(sled::open(temp_dir.path().join("weeks.db")).unwrap());
        let service = RadioService::new(db.clone());

        let station = service.add_station("Radio One", 25_000).unwrap();
        let show = service.add_show(&station.id, "Morning Drive", 1).unwrap();
        let song = service.add_song("Static Bloom", None).unwrap();

        // Sundays, one per offset, counted from 2024-01-07.
        let base = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        for offset in &week_offsets {
            let sunday = base + Days::new(offset * 7);
            let week = WeekStart::new_with(sunday.year(), sunday.month(), sunday.day());

            let submission = service
                .submit_song(
                    SubmissionDraft::new()
                        .for_song(&song.id)
                        .on_station(&station.id)
                        .backdated_to(week),
                )
                .unwrap();
            service.settle_submission(&submission.id).unwrap();
        }

        let playlists = store::playlists_for_show(&db, &show.id).unwrap();
        prop_assert_eq!(playlists.len(), week_offsets.len());
        prop_assert!(playlists.iter().all(|entry| entry.times_played == 1));

        let mut weeks: Vec<_> = playlists.iter().map(|entry| entry.week_start).collect();
        weeks.sort();
        weeks.dedup();
        prop_assert_eq!(weeks.len(), week_offsets.len());
    }
}
