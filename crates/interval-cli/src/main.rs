use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "interval-cli", version, about = "Interval timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment list management
    Segment {
        #[command(subcommand)]
        action: commands::segment::SegmentAction,
    },
    /// Repeat mode
    Repeat {
        #[command(subcommand)]
        action: commands::repeat::RepeatAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Show which segment is active after a given elapsed time
    Locate {
        /// Elapsed time (seconds, 1h30m, or MM:SS)
        elapsed: String,
        /// Override the stored repeat preference
        #[arg(long)]
        repeat: Option<bool>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Play the sequence in the foreground
    Run {
        /// Print snapshots and events as JSON lines
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let config = interval_core::Config::load_or_default();
    let filter = EnvFilter::try_from_env("INTERVAL_LOG")
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Segment { action } => commands::segment::run(action),
        Commands::Repeat { action } => commands::repeat::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Locate {
            elapsed,
            repeat,
            json,
        } => commands::locate::run(&elapsed, repeat, json),
        Commands::Run { json } => commands::run::run(json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
