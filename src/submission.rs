//! Submission record, its review state machine and the draft builder
use crate::error::DraftError;
use crate::time::{TimeStamp, WeekStart};
use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub enum SubmissionStatus {
    #[n(0)]
    Pending,
    #[n(1)]
    Accepted,
    #[n(2)]
    Rejected,
}

/// A band's request for a song to be aired by a station. Created as
/// `Pending`; settlement moves it to `Accepted`, the rejection flow to
/// `Rejected`. Both are terminal.
#[derive(Debug, Clone, PartialEq, minicbor::Encode, minicbor::Decode)]
pub struct Submission {
    #[n(0)]
    pub id: String,
    #[n(1)]
    pub song_id: String,
    #[n(2)]
    pub station_id: String,
    #[n(3)]
    pub week_submitted: Option<WeekStart>, // backdated submissions keep their original week
    #[n(4)]
    pub status: SubmissionStatus,
    #[n(5)]
    pub submitted_at: TimeStamp<Utc>,
    #[n(6)]
    pub reviewed_at: Option<TimeStamp<Utc>>,
    #[n(7)]
    pub rejection_reason: Option<String>,
}

impl Submission {
    pub fn is_terminal(&self) -> bool {
        self.status != SubmissionStatus::Pending
    }

    /// Transition to accepted and stamp review metadata. Acceptance clears
    /// any rejection reason a previous reviewer may have drafted.
    pub fn accept(&mut self, at: TimeStamp<Utc>) {
        self.status = SubmissionStatus::Accepted;
        self.reviewed_at = Some(at);
        self.rejection_reason = None;
    }

    pub fn reject(&mut self, reason: &str, at: TimeStamp<Utc>) {
        self.status = SubmissionStatus::Rejected;
        self.reviewed_at = Some(at);
        self.rejection_reason = Some(reason.to_string());
    }
}

// Also used for constructing drafts before anything is persisted
#[derive(Debug, Default)]
pub struct SubmissionDraft {
    song_id: Option<String>,
    station_id: Option<String>,
    week_submitted: Option<WeekStart>,
}

impl SubmissionDraft {
    /// Construct a new builder object, this becomes the basis for a draft
    pub fn new() -> Self {
        Self::default()
    }
    pub fn for_song(mut self, song_id: &str) -> Self {
        self.song_id = Some(song_id.to_string());
        self
    }
    pub fn on_station(mut self, station_id: &str) -> Self {
        self.station_id = Some(station_id.to_string());
        self
    }
    /// Pin the submission to the week it was originally queued in rather
    /// than the week it eventually gets reviewed.
    pub fn backdated_to(mut self, week: WeekStart) -> Self {
        self.week_submitted = Some(week);
        self
    }
    // Checks required fields; the service validates the references exist.
    pub fn finalise(self) -> Result<(String, String, Option<WeekStart>), DraftError> {
        let song_id = self.song_id.ok_or(DraftError::MissingSong)?;
        let station_id = self.station_id.ok_or(DraftError::MissingStation)?;

        Ok((song_id, station_id, self.week_submitted))
    }
}
