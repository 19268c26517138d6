//! One-off position lookup against the stored segment list.

use interval_core::timer::format::{format_hms, parse_duration};
use interval_core::timer::{locate, Lookup};
use interval_core::{Config, RepeatPreference, SegmentRepository};
use serde_json::json;

use super::open_store;

pub fn run(
    elapsed: &str,
    repeat: Option<bool>,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store(&config)?;
    let elapsed_secs = parse_duration(elapsed)?;
    let repeat = repeat.unwrap_or_else(|| store.is_repeated());
    let list = store.list()?;

    match locate(elapsed_secs, list.boundaries().as_slice(), repeat) {
        Lookup::Position(position) => {
            let name = list
                .get(position.segment_index)
                .map(|entry| entry.segment.name.as_str())
                .unwrap_or_default();
            if as_json {
                let value = json!({
                    "type": "position",
                    "segment_index": position.segment_index,
                    "segment_name": name,
                    "remaining_secs": position.remaining_secs,
                    "boundary": position.is_boundary(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!(
                    "{name} [{}] {} left",
                    position.segment_index,
                    format_hms(position.remaining_secs)
                );
            }
        }
        Lookup::Finished => {
            if as_json {
                println!(
                    "{}",
                    json!({ "type": "finished", "total_secs": list.total_secs() })
                );
            } else {
                println!("sequence finished at {}", format_hms(list.total_secs()));
            }
        }
        Lookup::Empty => {
            if as_json {
                println!("{}", json!({ "type": "empty" }));
            } else {
                println!("no segments");
            }
        }
    }
    Ok(())
}
