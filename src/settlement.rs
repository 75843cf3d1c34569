//! The settlement transaction: ordered mutation of the six entities.
//!
//! Loads and policy resolution happen in the service before the
//! transaction opens; everything here runs inside one `Tree::transaction`
//! so any abort, including the synthetic fault points, discards every
//! write of the attempt. sled retries the closure on conflict, which is
//! why the random draw, the clock and the candidate ids are resolved
//! once, outside, and passed in.

use crate::airplay::{
    EarningsEntry, EarningsSource, FameEvent, FameEventKind, PlayRecord, PlaylistEntry,
};
use crate::catalog::{Band, Song, Station};
use crate::error::SettlementError;
use crate::metrics::{PlayMetrics, RandomSource};
use crate::store;
use crate::submission::Submission;
use crate::time::{TimeStamp, WeekStart};
use crate::utils::mint_id;
use chrono::Utc;
use sled::Tree;
use sled::transaction::{ConflictableTransactionError, TransactionError};

/// Mutation steps a synthetic fault can be injected after. Each one maps
/// to a write the transaction must be able to discard wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    AfterAccept,
    AfterPlaylist,
    AfterPlayLog,
    AfterSongUpdate,
    AfterBandUpdate,
    AfterFameEvent,
    AfterEarnings,
}

/// Per-invocation knobs: a pinned clock, a pinned random source, and an
/// optional synthetic fault. Defaults settle with the system clock and
/// system randomness.
#[derive(Default)]
pub struct SettlementOptions {
    pub now: Option<TimeStamp<Utc>>,
    pub rng: Option<Box<dyn RandomSource>>,
    pub fail_point: Option<FailPoint>,
}

impl SettlementOptions {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn at(mut self, now: TimeStamp<Utc>) -> Self {
        self.now = Some(now);
        self
    }
    pub fn with_rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }
    /// Pin the single draw the settlement consumes.
    pub fn with_draw(self, r: f64) -> Self {
        self.with_rng(crate::metrics::FixedDraw(r))
    }
    pub fn fail_after(mut self, point: FailPoint) -> Self {
        self.fail_point = Some(point);
        self
    }
}

/// What a committed settlement did, returned to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementSummary {
    pub submission_id: String,
    pub playlist_id: String,
    pub play_id: String,
    pub show_id: String,
    pub band_id: Option<String>,
    pub week_start: WeekStart,
    pub listeners: u32,
    pub hype_gained: u32,
    pub streams_boost: u32,
    pub sales_boost: u32,
    pub times_played: u32,
    pub playlist_created: bool,
}

/// Candidate ids for the records this attempt may create. Minted before
/// the transaction so a conflict retry replays identical writes; unused
/// candidates (an existing playlist row, a skipped earnings entry) are
/// simply discarded.
pub(crate) struct FreshIds {
    pub playlist: String,
    pub play: String,
    pub fame: String,
    pub earnings: String,
}

impl FreshIds {
    pub(crate) fn mint() -> Self {
        Self {
            playlist: mint_id(store::PLAYLIST_HRP),
            play: mint_id(store::PLAY_HRP),
            fame: mint_id(store::FAME_HRP),
            earnings: mint_id(store::EARNINGS_HRP),
        }
    }
}

/// Everything the transaction needs, resolved up front by the service.
pub(crate) struct SettlementContext<'a> {
    pub submission_id: &'a str,
    pub song_id: &'a str,
    pub station: &'a Station,
    pub show_id: &'a str,
    pub week_start: WeekStart,
    pub metrics: PlayMetrics,
    pub now: TimeStamp<Utc>,
    pub fame_per_play: f64,
    pub fail_point: Option<FailPoint>,
    pub ids: FreshIds,
}

fn fail_if(
    requested: Option<FailPoint>,
    here: FailPoint,
) -> Result<(), ConflictableTransactionError<SettlementError>> {
    if requested == Some(here) {
        return Err(store::abort(SettlementError::Fault(here)));
    }
    Ok(())
}

pub(crate) fn run(
    tree: &Tree,
    ctx: &SettlementContext<'_>,
) -> Result<SettlementSummary, SettlementError> {
    let week_key = store::playlist_week_key(ctx.show_id, ctx.song_id, ctx.week_start);

    let result = tree.transaction(|tx| {
        // Re-read and guard the submission inside the transaction so two
        // concurrent settles of the same id conflict here instead of both
        // crediting the cascade.
        let mut submission: Submission = store::tx_get(tx, ctx.submission_id)?.ok_or_else(|| {
            store::abort(SettlementError::SubmissionNotFound(
                ctx.submission_id.to_string(),
            ))
        })?;
        if submission.is_terminal() {
            return Err(store::abort(SettlementError::AlreadySettled {
                id: submission.id,
                status: submission.status,
            }));
        }
        submission.accept(ctx.now.clone());
        store::tx_put(tx, ctx.submission_id, &submission)?;
        fail_if(ctx.fail_point, FailPoint::AfterAccept)?;

        // Weekly aggregate: find through the index key, otherwise create.
        // A racing creator makes this read conflict; the retry then finds
        // the freshly written row and increments it instead.
        let existing = tx
            .get(week_key.as_bytes())?
            .map(|raw| String::from_utf8_lossy(&raw).into_owned());
        let (entry, playlist_created) = match existing {
            Some(playlist_id) => {
                let mut entry: PlaylistEntry =
                    store::tx_get(tx, &playlist_id)?.ok_or_else(|| {
                        store::abort(SettlementError::Codec(format!(
                            "playlist index {week_key} points to a missing entry"
                        )))
                    })?;
                entry.record_spin(ctx.now.clone());
                (entry, false)
            }
            None => {
                let entry = PlaylistEntry {
                    id: ctx.ids.playlist.clone(),
                    show_id: ctx.show_id.to_string(),
                    song_id: ctx.song_id.to_string(),
                    week_start: ctx.week_start,
                    times_played: 1,
                    added_at: ctx.now.clone(),
                    is_active: true,
                };
                tx.insert(week_key.as_bytes(), entry.id.as_bytes())?;
                (entry, true)
            }
        };
        store::tx_put(tx, &entry.id, &entry)?;
        fail_if(ctx.fail_point, FailPoint::AfterPlaylist)?;

        // Append the immutable play record.
        let play = PlayRecord {
            id: ctx.ids.play.clone(),
            playlist_id: entry.id.clone(),
            show_id: ctx.show_id.to_string(),
            song_id: ctx.song_id.to_string(),
            station_id: ctx.station.id.clone(),
            listeners: ctx.metrics.listeners,
            hype_gained: ctx.metrics.hype_gained,
            streams_boost: ctx.metrics.streams_boost,
            sales_boost: ctx.metrics.sales_boost,
            played_at: ctx.now.clone(),
        };
        store::tx_put(tx, &play.id, &play)?;
        fail_if(ctx.fail_point, FailPoint::AfterPlayLog)?;

        // Song counters, one update.
        let mut song: Song = store::tx_get(tx, ctx.song_id)?.ok_or_else(|| {
            store::abort(SettlementError::SongNotFound(ctx.song_id.to_string()))
        })?;
        song.apply_play(&ctx.metrics, ctx.now.clone());
        store::tx_put(tx, ctx.song_id, &song)?;
        fail_if(ctx.fail_point, FailPoint::AfterSongUpdate)?;

        // Band cascade. A dangling band reference aborts the whole run; a
        // song must not gain hype while its claimed cascade vanishes.
        let mut band_id = None;
        if let Some(bid) = song.band_id.as_deref() {
            let mut band: Band = store::tx_get(tx, bid)?.ok_or_else(|| {
                store::abort(SettlementError::BandNotFound {
                    song: ctx.song_id.to_string(),
                    band: bid.to_string(),
                })
            })?;
            band.gain_fame(ctx.fame_per_play);
            store::tx_put(tx, bid, &band)?;
            fail_if(ctx.fail_point, FailPoint::AfterBandUpdate)?;

            let fame = FameEvent {
                id: ctx.ids.fame.clone(),
                band_id: bid.to_string(),
                fame_gained: ctx.fame_per_play,
                event: FameEventKind::RadioPlay {
                    station_id: ctx.station.id.clone(),
                    station_name: ctx.station.name.clone(),
                    play_id: play.id.clone(),
                },
            };
            store::tx_put(tx, &fame.id, &fame)?;
            fail_if(ctx.fail_point, FailPoint::AfterFameEvent)?;

            // The floors make a zero boost impossible today, but they are
            // configuration, so the ledger keeps its guard.
            if ctx.metrics.sales_boost > 0 {
                let earnings = EarningsEntry {
                    id: ctx.ids.earnings.clone(),
                    band_id: bid.to_string(),
                    amount: u64::from(ctx.metrics.sales_boost),
                    description: format!(
                        "Radio play of \"{}\" on {}",
                        song.title, ctx.station.name
                    ),
                    source: EarningsSource::RadioPlay {
                        station_id: ctx.station.id.clone(),
                        song_id: ctx.song_id.to_string(),
                        play_id: play.id.clone(),
                    },
                };
                store::tx_put(tx, &earnings.id, &earnings)?;
            }
            fail_if(ctx.fail_point, FailPoint::AfterEarnings)?;

            band_id = Some(bid.to_string());
        }

        Ok(SettlementSummary {
            submission_id: ctx.submission_id.to_string(),
            playlist_id: entry.id.clone(),
            play_id: play.id.clone(),
            show_id: ctx.show_id.to_string(),
            band_id,
            week_start: ctx.week_start,
            listeners: ctx.metrics.listeners,
            hype_gained: ctx.metrics.hype_gained,
            streams_boost: ctx.metrics.streams_boost,
            sales_boost: ctx.metrics.sales_boost,
            times_played: entry.times_played,
            playlist_created,
        })
    });

    match result {
        Ok(summary) => Ok(summary),
        Err(TransactionError::Abort(err)) => Err(err),
        Err(TransactionError::Storage(err)) => Err(SettlementError::Store(err)),
    }
}
