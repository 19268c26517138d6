//! Foreground timer: plays the stored sequence until it finishes or Ctrl-C.

use std::sync::Arc;

use interval_core::notify::CompositeNotifier;
use interval_core::timer::format::format_hms;
use interval_core::{Config, Event, SegmentRepository, SegmentStore, TimerRunner, TimerSnapshot, TimerState};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::open_store;

pub fn run(as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = Arc::new(open_store(&config)?);
    if store.list()?.is_empty() {
        return Err("no segments to play; add one with `segment add`".into());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(store, &config, as_json))
}

async fn drive(
    store: Arc<SegmentStore>,
    config: &Config,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let notifier = Arc::new(CompositeNotifier::from_config(&config.notifications));
    let runner = TimerRunner::new(store.clone(), store.clone(), notifier)?;
    let mut snapshots = runner.subscribe();
    let mut events = runner.subscribe_events();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    runner.start();
    info!(segments = store.list()?.len(), "playing sequence");

    // The idle snapshot is published before the finishing event is broadcast,
    // so the loop ends on the event, not on the snapshot.
    let mut went_idle = false;
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                // Edits from another process show up here, so count afresh.
                let total = SegmentRepository::observe(&*store).borrow().len();
                print_snapshot(&snapshot, total, as_json)?;
                went_idle = snapshot.state == TimerState::Idle;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    print_event(&event, as_json)?;
                    if matches!(event, Event::SequenceFinished { .. } | Event::TimerStopped { .. }) {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                    if went_idle {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => {
                let event = runner.stop();
                print_event(&event, as_json)?;
                break;
            }
        }
    }
    Ok(())
}

fn print_snapshot(
    snapshot: &TimerSnapshot,
    total: usize,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }
    match (&snapshot.position, &snapshot.segment_name) {
        (Some(position), Some(name)) => println!(
            "{name} [{}/{total}]  {} left  (elapsed {})",
            position.segment_index + 1,
            format_hms(position.remaining_secs),
            format_hms(snapshot.elapsed_secs)
        ),
        _ if snapshot.state == TimerState::Running => {
            println!("elapsed {}", format_hms(snapshot.elapsed_secs))
        }
        _ => {}
    }
    Ok(())
}

fn print_event(event: &Event, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        Event::BoundaryCrossed { segment_name, .. } => println!("-- {segment_name} done"),
        Event::SequenceFinished { total_secs, .. } => {
            println!("Sequence finished ({})", format_hms(*total_secs))
        }
        Event::TimerStopped { elapsed_secs, .. } => {
            println!("Stopped after {}", format_hms(*elapsed_secs))
        }
        _ => {}
    }
    Ok(())
}
