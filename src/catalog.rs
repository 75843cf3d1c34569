//! Stations, shows and the song/band catalog
use crate::metrics::PlayMetrics;
use crate::time::TimeStamp;
use crate::utils::round1;
use chrono::Utc;

/// A radio outlet. Read-only as far as settlement is concerned.
#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct Station {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub listener_base: u32,
}

/// A recurring programming slot on a station. Settlement always picks the
/// active show with the lowest time slot.
#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct Show {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub station_id: String,
    #[n(2)]
    pub name: String,
    #[n(3)]
    pub time_slot: u32, // ordering key within the station's schedule
    #[n(4)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct Song {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub title: String,
    #[n(2)]
    pub band_id: Option<String>, // unsigned tracks have no band
    #[n(3)]
    pub hype: u64,
    #[n(4)]
    pub total_radio_plays: u64,
    #[n(5)]
    pub streams: u64,
    #[n(6)]
    pub revenue: u64,
    #[n(7)]
    pub last_radio_play: Option<TimeStamp<Utc>>,
}

impl Song {
    /// Apply the deltas of one aired play as a single update.
    pub fn apply_play(&mut self, metrics: &PlayMetrics, at: TimeStamp<Utc>) {
        self.hype += u64::from(metrics.hype_gained);
        self.total_radio_plays += 1;
        self.streams += u64::from(metrics.streams_boost);
        self.revenue += u64::from(metrics.sales_boost);
        self.last_radio_play = Some(at);
    }
}

#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct Band {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub name: String,
    #[n(2)]
    pub fame: f64, // one-decimal precision
}

impl Band {
    pub fn gain_fame(&mut self, delta: f64) {
        self.fame = round1(self.fame + delta);
    }
}
