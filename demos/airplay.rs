//! Walkthrough: seed a tiny catalog, submit a song and settle it.

use radio_settlement::service::RadioService;
use radio_settlement::submission::SubmissionDraft;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db = sled::open("airplay-demo-db")?;
    if !db.is_empty() {
        db.clear()?;
    }

    let service = RadioService::new(Arc::new(db));

    let station = service.add_station("WKRP", 1_000)?;
    service.add_show(&station.id, "Morning Drive", 1)?;
    let band = service.add_band("The Pixelated", 2.0)?;
    let song = service.add_song("Static Bloom", Some(&band.id))?;

    let submission = service.submit_song(
        SubmissionDraft::new()
            .for_song(&song.id)
            .on_station(&station.id),
    )?;

    let summary = service.settle_submission(&submission.id)?;
    println!("{:#?}", summary);

    Ok(())
}
