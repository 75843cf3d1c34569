use crate::settlement::FailPoint;
use crate::submission::SubmissionStatus;

/// Failure surface of the settlement pipeline. Every variant aborts the
/// run with a full rollback; nothing is recovered locally.
#[derive(thiserror::Error, Debug)]
pub enum SettlementError {
    #[error("submission {0} not found")]
    SubmissionNotFound(String),
    #[error("song {0} not found")]
    SongNotFound(String),
    #[error("station {0} not found")]
    StationNotFound(String),
    #[error("station {0} has no active show")]
    NoActiveShow(String),
    #[error("song {song} references band {band}, which does not exist")]
    BandNotFound { song: String, band: String },
    #[error("submission {id} was already reviewed as {status:?}")]
    AlreadySettled { id: String, status: SubmissionStatus },
    #[error("synthetic fault injected after {0:?}")]
    Fault(FailPoint),
    #[error("store error: {0}")]
    Store(#[from] sled::Error),
    #[error("record codec error: {0}")]
    Codec(String),
}

#[derive(thiserror::Error, Debug)]
pub enum DraftError {
    #[error("submission draft has no song")]
    MissingSong,
    #[error("submission draft has no station")]
    MissingStation,
}
