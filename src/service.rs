//! Service layer API for the radio settlement workflow
use crate::catalog::{Band, Show, Song, Station};
use crate::config::SettlementConfig;
use crate::error::SettlementError;
use crate::metrics::{PlayMetrics, SystemRandom};
use crate::settlement::{
    self, FreshIds, SettlementContext, SettlementOptions, SettlementSummary,
};
use crate::store;
use crate::submission::{Submission, SubmissionDraft, SubmissionStatus};
use crate::time::{TimeStamp, WeekStart};
use crate::utils::new_uuid_to_bech32;
use std::sync::Arc;
use tracing::{debug, info};

pub struct RadioService {
    instance: Arc<sled::Db>,
    config: SettlementConfig,
}

impl RadioService {
    pub fn new(instance: Arc<sled::Db>) -> Self {
        Self {
            instance,
            config: SettlementConfig::default(),
        }
    }

    pub fn with_config(instance: Arc<sled::Db>, config: SettlementConfig) -> Self {
        Self { instance, config }
    }

    fn tree(&self) -> &sled::Tree {
        self.instance.as_ref()
    }

    /// Register a station. Stations are read-only inputs to settlement.
    pub fn add_station(&self, name: &str, listener_base: u32) -> anyhow::Result<Station> {
        if listener_base == 0 {
            return Err(anyhow::Error::msg("Listener base is set to zero"));
        }

        let station = Station {
            id: new_uuid_to_bech32(store::STATION_HRP)?,
            name: name.to_string(),
            listener_base,
        };
        store::put(self.tree(), &station.id, &station)?;

        Ok(station)
    }

    /// Register a programming slot on an existing station.
    pub fn add_show(&self, station_id: &str, name: &str, time_slot: u32) -> anyhow::Result<Show> {
        if store::get::<Station>(self.tree(), station_id)?.is_none() {
            return Err(SettlementError::StationNotFound(station_id.to_string()).into());
        }

        let show = Show {
            id: new_uuid_to_bech32(store::SHOW_HRP)?,
            station_id: station_id.to_string(),
            name: name.to_string(),
            time_slot,
            is_active: true,
        };
        store::put(self.tree(), &show.id, &show)?;

        Ok(show)
    }

    pub fn add_band(&self, name: &str, fame: f64) -> anyhow::Result<Band> {
        let band = Band {
            id: new_uuid_to_bech32(store::BAND_HRP)?,
            name: name.to_string(),
            fame,
        };
        store::put(self.tree(), &band.id, &band)?;

        Ok(band)
    }

    /// Add a song to the catalog. A band reference is validated here, at
    /// the boundary; settlement treats a dangling one as data corruption.
    pub fn add_song(&self, title: &str, band_id: Option<&str>) -> anyhow::Result<Song> {
        if let Some(band_id) = band_id {
            if store::get::<Band>(self.tree(), band_id)?.is_none() {
                return Err(SettlementError::BandNotFound {
                    song: title.to_string(),
                    band: band_id.to_string(),
                }
                .into());
            }
        }

        let song = Song {
            id: new_uuid_to_bech32(store::SONG_HRP)?,
            title: title.to_string(),
            band_id: band_id.map(str::to_string),
            hype: 0,
            total_radio_plays: 0,
            streams: 0,
            revenue: 0,
            last_radio_play: None,
        };
        store::put(self.tree(), &song.id, &song)?;

        Ok(song)
    }

    /// Queue a new submission for review, in `Pending` state.
    pub fn submit_song(&self, draft: SubmissionDraft) -> anyhow::Result<Submission> {
        let (song_id, station_id, week_submitted) = draft.finalise()?;

        if store::get::<Song>(self.tree(), &song_id)?.is_none() {
            return Err(SettlementError::SongNotFound(song_id).into());
        }
        if store::get::<Station>(self.tree(), &station_id)?.is_none() {
            return Err(SettlementError::StationNotFound(station_id).into());
        }

        let submission = Submission {
            id: new_uuid_to_bech32(store::SUBMISSION_HRP)?,
            song_id,
            station_id,
            week_submitted,
            status: SubmissionStatus::Pending,
            submitted_at: TimeStamp::new(),
            reviewed_at: None,
            rejection_reason: None,
        };
        store::put(self.tree(), &submission.id, &submission)?;
        debug!(submission = %submission.id, song = %submission.song_id, "song submitted for review");

        Ok(submission)
    }

    /// The terminal transition settlement never takes: `pending → rejected`.
    /// Stamps review metadata and leaves every other entity untouched.
    pub fn reject_submission(
        &self,
        submission_id: &str,
        reason: &str,
    ) -> Result<Submission, SettlementError> {
        let mut submission: Submission = store::get(self.tree(), submission_id)?
            .ok_or_else(|| SettlementError::SubmissionNotFound(submission_id.to_string()))?;

        if submission.is_terminal() {
            return Err(SettlementError::AlreadySettled {
                id: submission.id.clone(),
                status: submission.status,
            });
        }

        submission.reject(reason, TimeStamp::new());
        store::put(self.tree(), &submission.id, &submission)?;
        info!(submission = %submission.id, "radio submission rejected");

        Ok(submission)
    }

    /// Accept a pending submission and settle its airplay side effects in
    /// one atomic unit of work.
    pub fn settle_submission(
        &self,
        submission_id: &str,
    ) -> Result<SettlementSummary, SettlementError> {
        self.settle_submission_with(submission_id, SettlementOptions::new())
    }

    /// Settlement with an injected clock, random source or fault point.
    pub fn settle_submission_with(
        &self,
        submission_id: &str,
        options: SettlementOptions,
    ) -> Result<SettlementSummary, SettlementError> {
        let SettlementOptions {
            now,
            rng,
            fail_point,
        } = options;

        // Fail fast on anything the settlement depends on before opening
        // the transaction.
        let submission: Submission = store::get(self.tree(), submission_id)?
            .ok_or_else(|| SettlementError::SubmissionNotFound(submission_id.to_string()))?;
        let song: Song = store::get(self.tree(), &submission.song_id)?
            .ok_or_else(|| SettlementError::SongNotFound(submission.song_id.clone()))?;
        let station: Station = store::get(self.tree(), &submission.station_id)?
            .ok_or_else(|| SettlementError::StationNotFound(submission.station_id.clone()))?;

        let show = store::active_shows(self.tree(), &station.id)?
            .into_iter()
            .min_by_key(|show| show.time_slot)
            .ok_or_else(|| SettlementError::NoActiveShow(station.id.clone()))?;

        // Resolve clock, week and the single random draw once per attempt;
        // a backdated submission keeps the week it was queued in.
        let now = now.unwrap_or_else(TimeStamp::new);
        let week_start = submission
            .week_submitted
            .unwrap_or_else(|| WeekStart::containing(&now));
        let mut rng = rng.unwrap_or_else(|| Box::new(SystemRandom));
        let metrics = PlayMetrics::compute(station.listener_base, rng.draw(), &self.config);

        debug!(
            submission = %submission.id,
            song = %song.title,
            show = %show.id,
            week = %week_start,
            "settling against the station's earliest active show"
        );

        let ctx = SettlementContext {
            submission_id,
            song_id: &submission.song_id,
            station: &station,
            show_id: &show.id,
            week_start,
            metrics,
            now,
            fame_per_play: self.config.fame_per_play,
            fail_point,
            ids: FreshIds::mint(),
        };
        let summary = settlement::run(self.tree(), &ctx)?;

        info!(
            submission = %summary.submission_id,
            play = %summary.play_id,
            listeners = summary.listeners,
            times_played = summary.times_played,
            "radio submission settled"
        );

        Ok(summary)
    }
}
