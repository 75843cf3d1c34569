//! Weekly playlist aggregates and the append-only airplay audit records
use crate::time::{TimeStamp, WeekStart};
use chrono::Utc;

/// Aggregate of a song's airplay on one show within one calendar week.
/// At most one active entry exists per (show, song, week start) triple;
/// repeat plays increment the counter instead of adding rows.
#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct PlaylistEntry {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub show_id: String,
    #[n(2)]
    pub song_id: String,
    #[n(3)]
    pub week_start: WeekStart,
    #[n(4)]
    pub times_played: u32,
    #[n(5)]
    pub added_at: TimeStamp<Utc>,
    #[n(6)]
    pub is_active: bool,
}

impl PlaylistEntry {
    /// Fold one more play into the weekly aggregate.
    pub fn record_spin(&mut self, at: TimeStamp<Utc>) {
        self.times_played += 1;
        self.added_at = at;
        self.is_active = true;
    }
}

/// Immutable log of a single airing event. Never updated or merged; play
/// history traces back to its weekly aggregate through `playlist_id`.
#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct PlayRecord {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub playlist_id: String,
    #[n(2)]
    pub show_id: String,
    #[n(3)]
    pub song_id: String,
    #[n(4)]
    pub station_id: String,
    #[n(5)]
    pub listeners: u32,
    #[n(6)]
    pub hype_gained: u32,
    #[n(7)]
    pub streams_boost: u32,
    #[n(8)]
    pub sales_boost: u32,
    #[n(9)]
    pub played_at: TimeStamp<Utc>,
}

/// Audit trail of a band's fame changing.
#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct FameEvent {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub band_id: String,
    #[n(2)]
    pub fame_gained: f64,
    #[n(3)]
    pub event: FameEventKind,
}

#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub enum FameEventKind {
    #[n(0)]
    RadioPlay {
        #[n(0)]
        station_id: String,
        #[n(1)]
        station_name: String,
        #[n(2)]
        play_id: String,
    },
}

/// Audit trail of revenue credited to a band.
#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct EarningsEntry {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub band_id: String,
    #[n(2)]
    pub amount: u64,
    #[n(3)]
    pub description: String,
    #[n(4)]
    pub source: EarningsSource,
}

#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub enum EarningsSource {
    #[n(0)]
    RadioPlay {
        #[n(0)]
        station_id: String,
        #[n(1)]
        song_id: String,
        #[n(2)]
        play_id: String,
    },
}
