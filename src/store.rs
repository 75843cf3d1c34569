//! Typed access to the sled keyspace.
//!
//! Every record is keyed by its bech32 id; the human-readable prefix of
//! the id doubles as the record's namespace, so a prefix scan over
//! `show_1` walks exactly the shows. The one non-id key family is the
//! playlist week index, `plwk|<show>|<song>|<week>`, which maps a weekly
//! (show, song, week-start) triple to its playlist entry id.

use crate::airplay::{EarningsEntry, FameEvent, PlayRecord, PlaylistEntry};
use crate::catalog::Show;
use crate::error::SettlementError;
use crate::time::WeekStart;
use sled::Tree;
use sled::transaction::{ConflictableTransactionError, TransactionalTree};

pub const SUBMISSION_HRP: &str = "sub_";
pub const SONG_HRP: &str = "song_";
pub const BAND_HRP: &str = "band_";
pub const STATION_HRP: &str = "stn_";
pub const SHOW_HRP: &str = "show_";
pub const PLAYLIST_HRP: &str = "pl_";
pub const PLAY_HRP: &str = "play_";
pub const FAME_HRP: &str = "fame_";
pub const EARNINGS_HRP: &str = "earn_";

/// All keys of one record kind start with `<hrp>1` (the bech32 separator).
fn kind_prefix(hrp: &str) -> String {
    format!("{hrp}1")
}

/// Index key holding the playlist entry id for a weekly aggregate.
pub fn playlist_week_key(show_id: &str, song_id: &str, week: WeekStart) -> String {
    format!("plwk|{show_id}|{song_id}|{week}")
}

fn decode<T: for<'b> minicbor::Decode<'b, ()>>(raw: &[u8]) -> Result<T, SettlementError> {
    minicbor::decode(raw).map_err(|e| SettlementError::Codec(e.to_string()))
}

fn encode<T: minicbor::Encode<()>>(value: &T) -> Result<Vec<u8>, SettlementError> {
    minicbor::to_vec(value).map_err(|e| SettlementError::Codec(e.to_string()))
}

pub fn get<T: for<'b> minicbor::Decode<'b, ()>>(
    tree: &Tree,
    key: &str,
) -> Result<Option<T>, SettlementError> {
    match tree.get(key.as_bytes())? {
        Some(raw) => Ok(Some(decode(&raw)?)),
        None => Ok(None),
    }
}

pub fn put<T: minicbor::Encode<()>>(
    tree: &Tree,
    key: &str,
    value: &T,
) -> Result<(), SettlementError> {
    tree.insert(key.as_bytes(), encode(value)?)?;
    Ok(())
}

/// Decode every record under a key prefix.
pub fn scan<T: for<'b> minicbor::Decode<'b, ()>>(
    tree: &Tree,
    prefix: &str,
) -> Result<Vec<T>, SettlementError> {
    let mut records = Vec::new();
    for kv in tree.scan_prefix(prefix.as_bytes()) {
        let (_, raw) = kv?;
        records.push(decode(&raw)?);
    }
    Ok(records)
}

pub(crate) fn abort(err: SettlementError) -> ConflictableTransactionError<SettlementError> {
    ConflictableTransactionError::Abort(err)
}

pub(crate) fn tx_get<T: for<'b> minicbor::Decode<'b, ()>>(
    tx: &TransactionalTree,
    key: &str,
) -> Result<Option<T>, ConflictableTransactionError<SettlementError>> {
    match tx.get(key.as_bytes())? {
        Some(raw) => decode(&raw).map(Some).map_err(abort),
        None => Ok(None),
    }
}

pub(crate) fn tx_put<T: minicbor::Encode<()>>(
    tx: &TransactionalTree,
    key: &str,
    value: &T,
) -> Result<(), ConflictableTransactionError<SettlementError>> {
    let raw = encode(value).map_err(abort)?;
    tx.insert(key.as_bytes(), raw)?;
    Ok(())
}

// Query surface for callers and tests. These stay outside the settlement
// transaction; settlement itself only ever reads point keys.

pub fn active_shows(tree: &Tree, station_id: &str) -> Result<Vec<Show>, SettlementError> {
    let shows = scan::<Show>(tree, &kind_prefix(SHOW_HRP))?;
    Ok(shows
        .into_iter()
        .filter(|show| show.station_id == station_id && show.is_active)
        .collect())
}

pub fn playlists_for_show(
    tree: &Tree,
    show_id: &str,
) -> Result<Vec<PlaylistEntry>, SettlementError> {
    let entries = scan::<PlaylistEntry>(tree, &kind_prefix(PLAYLIST_HRP))?;
    Ok(entries
        .into_iter()
        .filter(|entry| entry.show_id == show_id)
        .collect())
}

pub fn plays_for_song(tree: &Tree, song_id: &str) -> Result<Vec<PlayRecord>, SettlementError> {
    let plays = scan::<PlayRecord>(tree, &kind_prefix(PLAY_HRP))?;
    Ok(plays
        .into_iter()
        .filter(|play| play.song_id == song_id)
        .collect())
}

pub fn fame_events_for_band(
    tree: &Tree,
    band_id: &str,
) -> Result<Vec<FameEvent>, SettlementError> {
    let events = scan::<FameEvent>(tree, &kind_prefix(FAME_HRP))?;
    Ok(events
        .into_iter()
        .filter(|event| event.band_id == band_id)
        .collect())
}

pub fn earnings_for_band(
    tree: &Tree,
    band_id: &str,
) -> Result<Vec<EarningsEntry>, SettlementError> {
    let entries = scan::<EarningsEntry>(tree, &kind_prefix(EARNINGS_HRP))?;
    Ok(entries
        .into_iter()
        .filter(|entry| entry.band_id == band_id)
        .collect())
}
