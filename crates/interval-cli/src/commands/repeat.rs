use clap::Subcommand;
use interval_core::{Config, RepeatPreference};

use super::open_store;

#[derive(Subcommand)]
pub enum RepeatAction {
    /// Show whether the sequence loops
    Status,
    /// Flip repeat mode
    Toggle,
}

pub fn run(action: RepeatAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = open_store(&config)?;

    let repeat = match action {
        RepeatAction::Status => store.is_repeated(),
        RepeatAction::Toggle => store.toggle()?,
    };
    println!("repeat: {}", if repeat { "on" } else { "off" });
    Ok(())
}
