//! Segment list management commands for CLI.

use clap::Subcommand;
use interval_core::timer::format::{format_hms, parse_duration};
use interval_core::{Config, Segment, SegmentId, SegmentRepository};

use super::open_store;

#[derive(Subcommand)]
pub enum SegmentAction {
    /// Append a segment to the end of the sequence
    Add {
        /// Segment name
        name: String,
        /// Duration: seconds, 1h30m / 2m15s, or MM:SS / HH:MM:SS
        duration: String,
    },
    /// List segments in playback order
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a segment by id
    Remove {
        /// Segment id (see `segment list`)
        id: i64,
    },
    /// Remove every segment
    Clear,
}

pub fn run(action: SegmentAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store(&config)?;

    match action {
        SegmentAction::Add { name, duration } => {
            let secs = parse_duration(&duration)?;
            let id = store.insert(Segment::new(name, secs)?)?;
            println!("Segment added: {id} ({})", format_hms(secs));
        }
        SegmentAction::List { json } => {
            let list = store.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
                return Ok(());
            }
            if list.is_empty() {
                println!("No segments.");
                return Ok(());
            }
            let boundaries = list.boundaries();
            for (entry, end) in list.all().iter().zip(boundaries.as_slice()) {
                println!(
                    "{:>4}  {:<24} {}  (ends at {})",
                    entry.id,
                    entry.segment.name,
                    format_hms(entry.segment.duration_secs),
                    format_hms(*end)
                );
            }
            println!("Total: {}", format_hms(boundaries.total()));
        }
        SegmentAction::Remove { id } => {
            if store.remove(SegmentId(id))? {
                println!("Segment removed: {id}");
            } else {
                println!("No segment with id {id}");
            }
        }
        SegmentAction::Clear => {
            store.clear()?;
            println!("All segments removed");
        }
    }
    Ok(())
}
