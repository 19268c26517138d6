pub mod config;
pub mod locate;
pub mod repeat;
pub mod run;
pub mod segment;

use interval_core::{Config, SegmentStore};

/// Open the segment database, applying the configured repeat default on first use.
pub fn open_store(config: &Config) -> Result<SegmentStore, Box<dyn std::error::Error>> {
    let store = SegmentStore::open()?;
    store.seed_repeat(config.timer.default_repeat)?;
    Ok(store)
}
